use std::time::Duration;

use chrono::{Local, Timelike};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{synthetic, weather_message, WeatherClient};
use crate::coordinator::Coordinator;

/// Refreshes the cosmetic data feeds (weather message, forecast, solar
/// readings) on a long interval, independent of telemetry.
pub struct FeedService {
    weather: WeatherClient,
    coordinator: Coordinator,
    interval: Duration,
}

impl FeedService {
    pub fn new(weather: WeatherClient, coordinator: Coordinator, interval_secs: u64) -> Self {
        Self {
            weather,
            coordinator,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs the refresh loop until `shutdown` is cancelled. The first cycle
    /// runs immediately.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Feed refresh loop started");
        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Feed refresh loop stopped");
                    return;
                }
                _ = ticker.tick() => self.run_once().await,
            }
        }
    }

    /// One refresh cycle. A failed weather fetch keeps the previous message.
    pub async fn run_once(&self) {
        if self.weather.is_configured() {
            // Fetch outside the coordinator lock; only the write takes it.
            match self.weather.current_temperature().await {
                Ok(temp) => {
                    info!(temp, "Weather updated");
                    self.coordinator
                        .update_weather_message(weather_message(temp))
                        .await;
                }
                Err(e) => warn!(error = %e, "Weather fetch failed; keeping previous value"),
            }
        }

        let forecast = synthetic::forecast(&mut rand::rng());
        self.coordinator.update_forecast(forecast).await;

        let now = Local::now();
        let solar = synthetic::solar_panel(
            &mut rand::rng(),
            now.hour(),
            now.format("%H:%M:%S").to_string(),
        );
        self.coordinator.update_solar_panel(solar).await;

        info!("Forecast and solar data refreshed");
    }
}
