//! Response schema normalization.
//!
//! Providers name their forecast columns differently across models and API
//! versions. The alias table below is the declared mapping onto the
//! canonical schema; a canonical field with no usable alias in the response
//! fails loudly. Defaults are never substituted.

use crate::error::ForecastError;
use crate::transport::RawForecast;
use cellguard_core::ingest::parse_timestamp;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Canonical fields and the provider aliases accepted for each.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("timestamp", &["timestamp", "ds"]),
    ("point_estimate", &["point_estimate", "TimeGPT", "yhat", "mean"]),
    (
        "lower_95",
        &["lower_95", "TimeGPT-lo-95", "yhat_lower_95", "lo-95"],
    ),
    (
        "upper_95",
        &["upper_95", "TimeGPT-hi-95", "yhat_upper_95", "hi-95"],
    ),
];

/// Forecast rows mapped onto the canonical schema, as parallel columns.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedForecast {
    pub timestamps: Vec<DateTime<Utc>>,
    pub point_estimates: Vec<f64>,
    pub lower_95: Vec<f64>,
    pub upper_95: Vec<f64>,
}

impl NormalizedForecast {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Map raw response rows onto the canonical schema, collecting every
/// canonical field that has no alias usable in all rows.
pub fn normalize(raw: &RawForecast) -> Result<NormalizedForecast, ForecastError> {
    let mut missing = Vec::new();
    let mut resolved: Vec<(&str, &str)> = Vec::new();
    for (canonical, aliases) in FIELD_ALIASES.iter().copied() {
        match aliases
            .iter()
            .copied()
            .find(|&alias| usable_in_all_rows(&raw.rows, alias, canonical))
        {
            Some(alias) if !raw.rows.is_empty() => resolved.push((canonical, alias)),
            _ => missing.push(canonical.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ForecastError::SchemaMismatch { missing });
    }

    let mut out = NormalizedForecast {
        timestamps: Vec::with_capacity(raw.rows.len()),
        point_estimates: Vec::with_capacity(raw.rows.len()),
        lower_95: Vec::with_capacity(raw.rows.len()),
        upper_95: Vec::with_capacity(raw.rows.len()),
    };
    for row in &raw.rows {
        for (canonical, alias) in &resolved {
            let value = &row[*alias];
            match *canonical {
                "timestamp" => out
                    .timestamps
                    .push(timestamp_of(value).expect("usability was checked per row")),
                "point_estimate" => out
                    .point_estimates
                    .push(value.as_f64().expect("usability was checked per row")),
                "lower_95" => out
                    .lower_95
                    .push(value.as_f64().expect("usability was checked per row")),
                "upper_95" => out
                    .upper_95
                    .push(value.as_f64().expect("usability was checked per row")),
                _ => unreachable!("alias table covers exactly the canonical fields"),
            }
        }
    }
    Ok(out)
}

fn usable_in_all_rows(rows: &[Map<String, Value>], alias: &str, canonical: &str) -> bool {
    rows.iter().all(|row| match row.get(alias) {
        Some(value) if canonical == "timestamp" => timestamp_of(value).is_some(),
        Some(value) => value.as_f64().is_some(),
        None => false,
    })
}

fn timestamp_of(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_timestamp)
}
