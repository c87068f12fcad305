use chrono::Weekday;
use serde::Serialize;

use crate::models::Campus;

/// Open/close bounds in decimal hours. Both bounds unset means closed all day.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HoursWindow {
    pub open: Option<f64>,
    pub close: Option<f64>,
}

impl HoursWindow {
    pub const CLOSED: HoursWindow = HoursWindow {
        open: None,
        close: None,
    };

    pub const fn between(open: f64, close: f64) -> Self {
        Self {
            open: Some(open),
            close: Some(close),
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.open, self.close) {
            (Some(open), Some(close)) => Some((open, close)),
            _ => None,
        }
    }

    pub fn contains(&self, time: f64) -> bool {
        match self.bounds() {
            Some((open, close)) => time >= open && time < close,
            None => false,
        }
    }
}

/// Each campus slices the week differently; Friday only stands apart at SJU.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DayCategory {
    Weekday,
    Weekend,
    Friday,
    Saturday,
    Sunday,
}

impl DayCategory {
    pub fn for_campus(campus: Campus, weekday: Weekday) -> Self {
        match campus {
            Campus::Csb => match weekday {
                Weekday::Sat | Weekday::Sun => DayCategory::Weekend,
                _ => DayCategory::Weekday,
            },
            Campus::Sju => match weekday {
                Weekday::Fri => DayCategory::Friday,
                Weekday::Sat => DayCategory::Saturday,
                Weekday::Sun => DayCategory::Sunday,
                _ => DayCategory::Weekday,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CsbSchedule {
    pub weekday: HoursWindow,
    pub weekend: HoursWindow,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SjuSchedule {
    pub weekday: HoursWindow,
    pub friday: HoursWindow,
    pub saturday: HoursWindow,
    pub sunday: HoursWindow,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiningSchedule {
    pub csb: CsbSchedule,
    pub sju: SjuSchedule,
}

pub const DINING_HOURS: DiningSchedule = DiningSchedule {
    csb: CsbSchedule {
        weekday: HoursWindow::between(7.0, 22.5),
        weekend: HoursWindow::between(9.0, 19.5),
    },
    sju: SjuSchedule {
        weekday: HoursWindow::between(7.0, 22.5),
        friday: HoursWindow::between(7.0, 19.5),
        saturday: HoursWindow::between(9.0, 18.0),
        sunday: HoursWindow::between(9.0, 19.5),
    },
};

impl DiningSchedule {
    /// Window for a campus and category. Categories the campus doesn't use are closed.
    pub fn window(&self, campus: Campus, category: DayCategory) -> HoursWindow {
        match (campus, category) {
            (Campus::Csb, DayCategory::Weekday) => self.csb.weekday,
            (Campus::Csb, DayCategory::Weekend) => self.csb.weekend,
            (Campus::Sju, DayCategory::Weekday) => self.sju.weekday,
            (Campus::Sju, DayCategory::Friday) => self.sju.friday,
            (Campus::Sju, DayCategory::Saturday) => self.sju.saturday,
            (Campus::Sju, DayCategory::Sunday) => self.sju.sunday,
            _ => HoursWindow::CLOSED,
        }
    }

    pub fn window_on(&self, campus: Campus, weekday: Weekday) -> HoursWindow {
        self.window(campus, DayCategory::for_campus(campus, weekday))
    }
}
