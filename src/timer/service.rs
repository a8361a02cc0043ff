use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::coordinator::Coordinator;

/// Fixed period of the lamp timer engine.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Drives the lamp timer engine: once per period, expired timers switch
/// their lamp off and stale timers are dropped.
pub struct TimerService {
    coordinator: Coordinator,
    period: Duration,
}

impl TimerService {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            period: TICK_PERIOD,
        }
    }

    /// Runs the tick loop until `shutdown` is cancelled.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(period_ms = self.period.as_millis() as u64, "Lamp timer loop started");
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Lamp timer loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.coordinator.tick().await;
                }
            }
        }
    }
}
