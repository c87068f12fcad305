use std::fmt;

use serde::{Deserialize, Serialize};

use super::Campus;

/// A single reading. `None` means the value is unavailable, never zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub feels_like: Option<f64>,
}

impl WeatherData {
    pub const UNAVAILABLE: WeatherData = WeatherData {
        temp: None,
        humidity: None,
        feels_like: None,
    };

    pub fn is_unavailable(&self) -> bool {
        self.temp.is_none() && self.humidity.is_none() && self.feels_like.is_none()
    }

    pub fn format_temp(&self, unit: TemperatureUnit) -> String {
        format_degrees(self.temp, unit)
    }

    pub fn format_feels_like(&self, unit: TemperatureUnit) -> String {
        format_degrees(self.feels_like, unit)
    }

    pub fn format_humidity(&self) -> String {
        match self.humidity {
            Some(value) => format!("{value}%"),
            None => "--".to_string(),
        }
    }
}

fn format_degrees(value: Option<f64>, unit: TemperatureUnit) -> String {
    match value {
        Some(value) => format!("{value}°{unit}"),
        None => format!("--°{unit}"),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    F,
    C,
}

impl TemperatureUnit {
    /// Value of the `units` query parameter understood by WeatherStack.
    pub fn api_code(&self) -> &'static str {
        match self {
            TemperatureUnit::F => "f",
            TemperatureUnit::C => "m",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::F => f.write_str("F"),
            TemperatureUnit::C => f.write_str("C"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampusWeather {
    pub reading: WeatherData,
    pub loading: bool,
}

impl Default for CampusWeather {
    fn default() -> Self {
        Self {
            reading: WeatherData::UNAVAILABLE,
            loading: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WeatherState {
    pub csb: CampusWeather,
    pub sju: CampusWeather,
}

impl WeatherState {
    pub fn get(&self, campus: Campus) -> &CampusWeather {
        match campus {
            Campus::Csb => &self.csb,
            Campus::Sju => &self.sju,
        }
    }

    pub fn get_mut(&mut self, campus: Campus) -> &mut CampusWeather {
        match campus {
            Campus::Csb => &mut self.csb,
            Campus::Sju => &mut self.sju,
        }
    }
}
