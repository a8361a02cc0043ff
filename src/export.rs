use anyhow::{anyhow, Context, Result};
use chrono::Local;

use crate::models::ExportRow;

pub const FILENAME: &str = "Report.csv";

/// Render archive rows as a two-column `Time,Temperature` CSV sheet.
pub fn render_csv(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Time", "Temperature"])
        .context("Failed to write CSV header")?;

    for row in rows {
        wtr.write_record([
            row.time
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            row.temperature.to_string(),
        ])
        .context("Failed to write CSV row")?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow!("Failed to finish CSV export: {}", e.error()))
}
