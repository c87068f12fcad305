use std::path::PathBuf;

use crate::weather::client::DEFAULT_BASE_URL;

const DEFAULT_DATA_DIR: &str = ".dining-battle";

/// Process-level settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Without a key the weather refresher is not started.
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            data_dir: non_empty("DINING_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            weather_api_key: non_empty("WEATHERSTACK_API_KEY"),
            weather_base_url: non_empty("WEATHERSTACK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            debug: non_empty("DINING_DEBUG")
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("dining.sqlite3")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}
