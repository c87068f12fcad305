pub mod controller;
pub mod state;

pub use controller::{ResetScheduler, SchedulerConfig};
pub use state::CrowdResetState;
