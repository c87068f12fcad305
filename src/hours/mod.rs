pub mod resolver;
pub mod schedule;

pub use resolver::{current_meal_period, is_open, open_status, today_hours, OpenStatus};
pub use schedule::{DayCategory, DiningSchedule, HoursWindow, DINING_HOURS};
