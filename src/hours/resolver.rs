use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    models::{Campus, MealPeriod},
    utils::time::decimal_hours,
};

use super::schedule::{HoursWindow, DINING_HOURS};

const BREAKFAST: (f64, f64) = (7.0, 10.5);
const LUNCH: (f64, f64) = (11.0, 14.5);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct OpenStatus {
    pub csb: bool,
    pub sju: bool,
}

impl OpenStatus {
    pub fn get(&self, campus: Campus) -> bool {
        match campus {
            Campus::Csb => self.csb,
            Campus::Sju => self.sju,
        }
    }

    pub fn any(&self) -> bool {
        self.csb || self.sju
    }
}

pub fn today_hours(campus: Campus, date: NaiveDate) -> HoursWindow {
    DINING_HOURS.window_on(campus, date.weekday())
}

pub fn is_open(campus: Campus, now: NaiveDateTime) -> bool {
    today_hours(campus, now.date()).contains(decimal_hours(now.time()))
}

pub fn open_status(now: NaiveDateTime) -> OpenStatus {
    OpenStatus {
        csb: is_open(Campus::Csb, now),
        sju: is_open(Campus::Sju, now),
    }
}

/// Global meal label. Closed whenever neither hall is open; the bands don't care
/// which hall it is.
pub fn current_meal_period(now: NaiveDateTime) -> MealPeriod {
    if !open_status(now).any() {
        return MealPeriod::Closed;
    }

    let time = decimal_hours(now.time());
    if in_band(time, BREAKFAST) {
        MealPeriod::Breakfast
    } else if in_band(time, LUNCH) {
        MealPeriod::Lunch
    } else {
        MealPeriod::Dinner
    }
}

fn in_band(time: f64, (start, end): (f64, f64)) -> bool {
    time >= start && time < end
}
