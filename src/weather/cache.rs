use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use log::{debug, warn};
use tokio::time::Instant;

use crate::models::WeatherData;

use super::client::WeatherSource;

pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy)]
struct CachedReading {
    data: WeatherData,
    fetched_at: Instant,
}

/// Memoizes readings per location. Only successful fetches are stored, so a failure
/// is retried on the next call instead of pinning the null reading for five minutes.
pub struct WeatherCache<S> {
    source: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedReading>>,
}

impl<S: WeatherSource> WeatherCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, CACHE_DURATION)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Never fails: any transport, status or payload error yields the all-null reading.
    pub async fn fetch(&self, location: &str) -> WeatherData {
        if let Some(data) = self.fresh(location) {
            debug!("Using cached weather data for {location}");
            return data;
        }

        match self.source.fetch_current(location).await {
            Ok(data) => {
                self.entries().insert(
                    location.to_string(),
                    CachedReading {
                        data,
                        fetched_at: Instant::now(),
                    },
                );
                data
            }
            Err(err) => {
                warn!("Failed to fetch weather for {location}: {err:?}");
                WeatherData::UNAVAILABLE
            }
        }
    }

    pub fn is_cached(&self, location: &str) -> bool {
        self.fresh(location).is_some()
    }

    pub fn clear_cache(&self) {
        self.entries().clear();
    }

    fn fresh(&self, location: &str) -> Option<WeatherData> {
        self.entries()
            .get(location)
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.data)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CachedReading>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
