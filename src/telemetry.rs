use std::{collections::VecDeque, path::PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::{
    models::{ChartPoint, ExportRow, SensorData},
    store,
};

/// Number of points kept for the dashboard chart.
pub const CHART_WINDOW: usize = 50;

/// Telemetry history: a bounded chart window for the dashboard plus the
/// full archive, which is rewritten to disk on every append.
#[derive(Debug, Clone)]
pub struct TelemetryLog {
    path: PathBuf,
    chart: VecDeque<ChartPoint>,
    archive: Vec<SensorData>,
}

impl TelemetryLog {
    /// The chart window starts empty; it is only fed by live telemetry.
    pub fn new(path: impl Into<PathBuf>, archive: Vec<SensorData>) -> Self {
        Self {
            path: path.into(),
            chart: VecDeque::with_capacity(CHART_WINDOW),
            archive,
        }
    }

    /// Load the archive from `path`. A missing or malformed file yields an
    /// empty archive.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let archive: Vec<SensorData> = store::load(&path).await;
        info!(path = %path.display(), records = archive.len(), "Telemetry archive loaded");
        Self::new(path, archive)
    }

    /// Append `data` to the chart window and the archive, then persist the
    /// archive. A failed write is logged; the in-memory append stands.
    pub async fn record(&mut self, data: &SensorData) {
        if self.chart.len() >= CHART_WINDOW {
            self.chart.pop_front();
        }
        self.chart.push_back(ChartPoint {
            t: data.time.with_timezone(&Local).format("%H:%M").to_string(),
            v: data.temp,
        });

        self.archive.push(data.clone());
        if let Err(e) = store::save(&self.path, &self.archive).await {
            warn!(path = %self.path.display(), error = %e, "Failed to persist telemetry archive");
        }
    }

    pub fn chart(&self) -> Vec<ChartPoint> {
        self.chart.iter().cloned().collect()
    }

    pub fn archive_len(&self) -> usize {
        self.archive.len()
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.archive
            .iter()
            .map(|d| ExportRow {
                time: d.time,
                temperature: d.temp,
            })
            .collect()
    }
}
