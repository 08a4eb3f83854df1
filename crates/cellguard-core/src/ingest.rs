//! Tabular sensor input.

use crate::error::SeriesError;
use crate::types::{ColumnSpec, RawReading};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

/// Read raw readings from a CSV file with the named timestamp and value
/// columns.
///
/// A missing column is a caller error and fails immediately. Rows whose
/// timestamp or value do not parse are dropped; the sensor feed is allowed to
/// be noisy, the header is not.
pub fn read_readings(
    path: impl AsRef<Path>,
    columns: &ColumnSpec,
) -> Result<Vec<RawReading>, SeriesError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();
    let time_idx = headers
        .iter()
        .position(|h| h == columns.time_col)
        .ok_or_else(|| SeriesError::MissingColumn(columns.time_col.clone()))?;
    let value_idx = headers
        .iter()
        .position(|h| h == columns.value_col)
        .ok_or_else(|| SeriesError::MissingColumn(columns.value_col.clone()))?;

    let mut readings = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        let timestamp = record.get(time_idx).and_then(parse_timestamp);
        let value = record
            .get(value_idx)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        match (timestamp, value) {
            (Some(timestamp), Some(value)) => readings.push(RawReading { timestamp, value }),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(
            "dropped {} rows with unparseable timestamp or value",
            dropped
        );
    }
    Ok(readings)
}

/// Parse a sensor timestamp: RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS`
/// treated as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
