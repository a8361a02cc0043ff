pub mod models;
pub mod service;
pub mod synthetic;

pub use service::FeedService;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::Config;

use self::models::CurrentWeatherResponse;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for an OpenWeatherMap-compatible "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    city: String,
}

impl WeatherClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_endpoint(
            &config.weather_url,
            config.weather_api_key.clone(),
            &config.weather_city,
        )
    }

    pub fn with_endpoint(base_url: &str, api_key: Option<String>, city: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build weather HTTP client")?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.to_owned(),
                api_key,
                city: city.to_owned(),
            }),
        })
    }

    /// Whether an API key is configured; without one no request is made.
    pub fn is_configured(&self) -> bool {
        self.inner.api_key.is_some()
    }

    /// Current outdoor temperature in °C for the configured city.
    pub async fn current_temperature(&self) -> Result<f64> {
        let api_key = self
            .inner
            .api_key
            .as_deref()
            .context("No weather API key configured")?;
        let url = Url::parse_with_params(
            &self.inner.base_url,
            &[
                ("q", self.inner.city.as_str()),
                ("appid", api_key),
                ("units", "metric"),
            ],
        )
        .with_context(|| format!("invalid weather URL: {}", self.inner.base_url))?;
        debug!(city = %self.inner.city, "Fetching current weather");

        let bytes = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .context("Weather request failed")?
            .error_for_status()
            .context("Weather endpoint returned error status")?
            .bytes()
            .await
            .context("Failed to read weather response body")?;

        let resp = serde_json::from_slice::<CurrentWeatherResponse>(&bytes)
            .context("Failed to deserialize weather response")?;

        Ok(resp.main.temp)
    }
}

/// Format a temperature the way the sensor board displays it.
pub fn weather_message(temp: f64) -> String {
    format!("{temp:.1}°C")
}
