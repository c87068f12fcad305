pub mod aggregator;
pub mod capped;
pub mod commands;
pub mod controller;
pub mod reactions;

pub use aggregator::Rejection;
pub use controller::{DashboardSnapshot, DiningController, DiningHandle, IntentReceipt};
