pub mod cache;
pub mod client;

pub use cache::{WeatherCache, CACHE_DURATION};
pub use client::{WeatherSource, WeatherStackClient};
