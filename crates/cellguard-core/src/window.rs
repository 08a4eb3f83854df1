//! Historical window extraction.
//!
//! Isolates the most recent period the electrolyzer was actually operating:
//! zero and near-zero readings mean the unit was offline or the sensor
//! dropped out, so the window is anchored on the last contiguous run of
//! strictly positive values, padded backward with context for the forecaster
//! and never extended past the run's end.

use crate::error::SeriesError;
use crate::regularize::{default_interval, drop_missing, regularize, DEFAULT_MAX_GAP};
use crate::types::{RawReading, VoltagePoint, VoltageSeries, WindowConfig};
use chrono::{DateTime, Duration, Utc};

/// Extracts the most recent valid operating window from raw readings.
pub struct WindowExtractor {
    config: WindowConfig,
}

impl WindowExtractor {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(WindowConfig::default())
    }

    /// Select the last operating streak plus backward context, normalize
    /// units to volts, and regularize to one-minute cadence.
    pub fn extract(&self, readings: &[RawReading]) -> Result<VoltageSeries, SeriesError> {
        let mut rows: Vec<RawReading> = readings.to_vec();
        rows.sort_by_key(|r| r.timestamp);

        let streak_end = rows.iter().rposition(|r| r.value > 0.0).ok_or_else(|| {
            SeriesError::NoUsableData("no strictly positive readings in input".into())
        })?;
        let mut streak_start = streak_end;
        while streak_start > 0 && rows[streak_start - 1].value > 0.0 {
            streak_start -= 1;
        }

        let window_start =
            rows[streak_start].timestamp - Duration::minutes(self.config.pad_minutes);
        let window_end = rows[streak_end].timestamp;

        let mut selected: Vec<RawReading> = rows
            .iter()
            .filter(|r| r.timestamp >= window_start && r.timestamp <= window_end)
            .copied()
            .collect();
        if selected.is_empty() {
            tracing::warn!(
                "padded window selected no rows; falling back to the last {} raw rows",
                self.config.max_points
            );
            let start = rows.len().saturating_sub(self.config.max_points);
            selected = rows[start..].to_vec();
        }
        if selected.len() > self.config.max_points {
            selected.drain(..selected.len() - self.config.max_points);
        }

        let scale = self.unit_scale(&selected);
        let pairs: Vec<(DateTime<Utc>, f64)> = selected
            .iter()
            .map(|r| (r.timestamp, r.value * scale))
            .collect();

        let points = drop_missing(regularize(&pairs, default_interval(), DEFAULT_MAX_GAP))
            .into_iter()
            .map(|(timestamp, volts)| VoltagePoint { timestamp, volts })
            .collect();
        Ok(VoltageSeries::from_points(points))
    }

    /// Millivolt detection: the median is robust to spikes, and a median
    /// above the cutoff puts the column three orders of magnitude outside
    /// the cell operating range.
    fn unit_scale(&self, selected: &[RawReading]) -> f64 {
        let mut values: Vec<f64> = selected.iter().map(|r| r.value).collect();
        let med = median(&mut values);
        if med > self.config.mv_median_cutoff {
            tracing::info!(
                "value median {:.1} exceeds {:.1}; converting millivolts to volts",
                med,
                self.config.mv_median_cutoff
            );
            1e-3
        } else {
            1.0
        }
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.partial_cmp(b).expect("readings are finite"));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
