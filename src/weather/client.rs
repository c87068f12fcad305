use std::future::Future;

use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::models::{TemperatureUnit, WeatherData};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherstack.com/current";

/// Anything that can produce a current reading for a location string.
pub trait WeatherSource: Send + Sync + 'static {
    fn fetch_current(&self, location: &str) -> impl Future<Output = Result<WeatherData>> + Send;
}

#[derive(Deserialize, Debug)]
struct WeatherStackCurrent {
    temperature: Option<f64>,
    humidity: Option<f64>,
    feelslike: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct WeatherStackError {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

#[derive(Deserialize, Debug)]
struct WeatherStackResponse {
    current: Option<WeatherStackCurrent>,
    error: Option<WeatherStackError>,
}

/// Maps a WeatherStack body to a reading. An `error` object is a failure even on HTTP 200;
/// a missing `current` block is a success with nothing in it.
pub fn parse_weatherstack_body(body: &str) -> Result<WeatherData> {
    let response: WeatherStackResponse =
        serde_json::from_str(body).context("failed to decode weather response")?;

    if let Some(error) = response.error {
        return Err(anyhow!(
            "weather API error {}: {}",
            error.code.unwrap_or_default(),
            error
                .info
                .or(error.kind)
                .unwrap_or_else(|| "API Error".to_string())
        ));
    }

    Ok(match response.current {
        Some(current) => WeatherData {
            temp: current.temperature,
            humidity: current.humidity,
            feels_like: current.feelslike,
        },
        None => WeatherData::UNAVAILABLE,
    })
}

#[derive(Clone)]
pub struct WeatherStackClient {
    client: Client,
    base_url: String,
    api_key: String,
    unit: TemperatureUnit,
}

impl WeatherStackClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, unit: TemperatureUnit) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            unit,
        }
    }
}

impl WeatherSource for WeatherStackClient {
    async fn fetch_current(&self, location: &str) -> Result<WeatherData> {
        debug!("Fetching weather for {location}");
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("query", location),
                ("units", self.unit.api_code()),
            ])
            .send()
            .await
            .with_context(|| format!("weather request for {location} failed"))?;

        if !resp.status().is_success() {
            return Err(anyhow!("weather API returned {}", resp.status()));
        }

        let body = resp.text().await.context("failed to read weather body")?;
        parse_weatherstack_body(&body)
    }
}
