pub mod campus;
pub mod dining;
pub mod weather;

pub use campus::{Campus, CrowdLevel, MealPeriod};
pub use dining::{DiningData, FeedbackLog, Reaction, ReactionHistory, VotesState, RECENT_LIMIT};
pub use weather::{CampusWeather, TemperatureUnit, WeatherData, WeatherState};
