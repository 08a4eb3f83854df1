use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw sensor row as read from the input file.
///
/// Values may be zero (sensor dropout or unit offline) and may be recorded in
/// millivolts or volts. Input order and timestamp uniqueness are not
/// guaranteed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// One point of a prepared voltage series, always in volts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoltagePoint {
    pub timestamp: DateTime<Utc>,
    pub volts: f64,
}

/// Prepared cell-voltage series.
///
/// Timestamps are strictly increasing, unique, and aligned to a one-minute
/// grid; consecutive points are one minute apart except where a long sensor
/// outage was dropped. Values are volts. A series is never mutated in place:
/// appending a point (see [`crate::simulate`]) produces a new series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoltageSeries {
    points: Vec<VoltagePoint>,
}

impl VoltageSeries {
    pub fn from_points(points: Vec<VoltagePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[VoltagePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&VoltagePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&VoltagePoint> {
        self.points.last()
    }

    /// Voltage values in series order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volts).collect()
    }
}

/// One forecast step with calibrated failure risk.
///
/// `failure_probability` is the probability that the voltage meets or exceeds
/// the critical threshold at this step, always within `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub point_estimate: f64,
    pub lower_95: f64,
    pub upper_95: f64,
    pub failure_probability: f64,
}

/// Named columns of the tabular input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub time_col: String,
    pub value_col: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            time_col: "ds".to_string(),
            value_col: "y".to_string(),
        }
    }
}

/// Configuration for historical window extraction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Hard cap on selected rows; the most recent rows win.
    pub max_points: usize,
    /// Wall-clock context added before the operating streak, in minutes.
    pub pad_minutes: i64,
    /// Median above this value means the column is in millivolts.
    /// Domain-specific: cells in this fleet operate near 0.45-0.70 V.
    pub mv_median_cutoff: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_points: 4000,
            pad_minutes: 180,
            mv_median_cutoff: 100.0,
        }
    }
}

/// Configuration for the real-time reading simulator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Standard deviation of the per-minute Gaussian noise, in volts.
    pub noise_sigma_v: f64,
    /// Lower clamp of the simulated operating band, in volts.
    pub min_volts: f64,
    /// Upper clamp of the simulated operating band, in volts.
    pub max_volts: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            noise_sigma_v: 0.001,
            min_volts: 0.45,
            max_volts: 0.70,
        }
    }
}
