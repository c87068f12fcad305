use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::models::{Campus, TemperatureUnit};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherSettings {
    pub csb_location: String,
    pub sju_location: String,
    pub unit: TemperatureUnit,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            csb_location: "St. Joseph, MN".into(),
            sju_location: "Collegeville, MN".into(),
            unit: TemperatureUnit::F,
        }
    }
}

impl WeatherSettings {
    pub fn location(&self, campus: Campus) -> &str {
        match campus {
            Campus::Csb => &self.csb_location,
            Campus::Sju => &self.sju_location,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct UserSettings {
    weather: WeatherSettings,
    persist_snapshots: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            weather: WeatherSettings::default(),
            persist_snapshots: true,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    /// Loads `path`, falling back to defaults for a missing or unreadable file.
    /// A missing file is written out so it can be edited by hand.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings in {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            let defaults = UserSettings::default();
            persist(&path, &defaults)?;
            info!("Wrote default settings to {}", path.display());
            defaults
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn weather(&self) -> WeatherSettings {
        self.read().weather.clone()
    }

    pub fn persist_snapshots(&self) -> bool {
        self.read().persist_snapshots
    }

    pub fn update_weather(&self, settings: WeatherSettings) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.weather = settings;
        persist(&self.path, &guard)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn persist(path: &Path, data: &UserSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}
