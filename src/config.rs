use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// JSON document holding the RFID allow-list.
    pub cards_path: PathBuf,
    /// JSON document holding the telemetry archive.
    pub archive_path: PathBuf,
    /// Grant every card while the allow-list is empty (bootstrap mode).
    pub allow_all_when_empty: bool,
    /// Weather / forecast / solar refresh interval in seconds.
    pub feed_interval_secs: u64,
    /// OpenWeatherMap-compatible "current weather" endpoint.
    pub weather_url: String,
    /// Live weather is skipped when no key is configured.
    pub weather_api_key: Option<String>,
    pub weather_city: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            cards_path: optional("CARDS_PATH", "cards.json").into(),
            archive_path: optional("ARCHIVE_PATH", "data.json").into(),
            allow_all_when_empty: parse_flag(&optional("ALLOW_ALL_WHEN_EMPTY", "true"))
                .context("ALLOW_ALL_WHEN_EMPTY must be a boolean")?,
            feed_interval_secs: parse_interval(&optional("FEED_INTERVAL_SECS", "900"))
                .context("FEED_INTERVAL_SECS must be a positive integer")?,
            weather_url: optional(
                "WEATHER_URL",
                "http://api.openweathermap.org/data/2.5/weather",
            ),
            weather_api_key: std::env::var("WEATHER_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            weather_city: optional("WEATHER_CITY", "Chisinau"),
        })
    }
}

/// Parse a boolean env value: `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("expected a boolean, got {other:?}")),
    }
}

/// Parse a refresh interval in seconds. Zero is rejected.
fn parse_interval(raw: &str) -> Result<u64> {
    let secs: u64 = raw.trim().parse()?;
    if secs == 0 {
        anyhow::bail!("interval must be non-zero");
    }
    Ok(secs)
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
