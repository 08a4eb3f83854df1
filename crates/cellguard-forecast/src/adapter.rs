//! The staged forecast pipeline.

use crate::error::ForecastError;
use crate::normalize::normalize;
use crate::stage::ForecastStage;
use crate::transport::{ForecastRequest, ForecastTransport};
use cellguard_core::{
    default_interval, drop_missing, exceedance_probabilities, regularize, ForecastPoint,
    VoltageSeries, DEFAULT_MAX_GAP,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum minutes of clean context the forecaster needs.
pub const MIN_CONTEXT_MINUTES: usize = 60;

/// IQR multiplier for the pre-forecast outlier guard.
const IQR_MULTIPLIER: f64 = 2.0;

/// Adapter configuration. The cadence is fixed at one minute; `freq` is the
/// wire spelling of that cadence for the service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub series_id: String,
    pub freq: String,
    pub confidence_level: u8,
    pub max_gap: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            series_id: "electrolyzer_1".to_string(),
            freq: "1min".to_string(),
            confidence_level: 95,
            max_gap: DEFAULT_MAX_GAP,
        }
    }
}

/// Bridges a prepared voltage series to the external forecasting capability
/// and converts its confidence bounds into failure risk.
///
/// Stages per call: validating, cleaning, calling, normalizing,
/// computing-risk. Any stage fails the call terminally; retry policy belongs
/// to the caller. Parallel calls with different inputs are safe: the adapter
/// holds no mutable state.
pub struct ForecastAdapter {
    config: AdapterConfig,
    transport: Arc<dyn ForecastTransport>,
}

impl ForecastAdapter {
    pub fn new(transport: Arc<dyn ForecastTransport>) -> Self {
        Self::with_config(AdapterConfig::default(), transport)
    }

    pub fn with_config(config: AdapterConfig, transport: Arc<dyn ForecastTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Forecast `horizon_minutes` steps ahead and attach the probability of
    /// exceeding `critical_threshold_v` to each step.
    pub async fn forecast(
        &self,
        series: &VoltageSeries,
        horizon_minutes: u32,
        critical_threshold_v: f64,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        tracing::debug!("forecast stage: {}", ForecastStage::Validating);
        let pairs: Vec<(DateTime<Utc>, f64)> = series
            .points()
            .iter()
            .map(|p| (p.timestamp, p.volts))
            .collect();
        let clean = self.regular(&pairs);
        if clean.len() < MIN_CONTEXT_MINUTES {
            return Err(ForecastError::InsufficientData {
                actual: clean.len(),
                required: MIN_CONTEXT_MINUTES,
            });
        }

        tracing::debug!("forecast stage: {}", ForecastStage::Cleaning);
        let clean = clip_outliers(clean);
        let clean = dedupe_keep_first(clean);
        // Outlier removal may have opened new short gaps; re-fill them.
        let clean = self.regular(&clean);

        tracing::debug!("forecast stage: {}", ForecastStage::Calling);
        let request = ForecastRequest {
            series_id: self.config.series_id.clone(),
            timestamps: clean.iter().map(|(ts, _)| *ts).collect(),
            values: clean.iter().map(|(_, v)| *v).collect(),
            horizon: horizon_minutes,
            freq: self.config.freq.clone(),
            confidence_levels: vec![self.config.confidence_level],
        };
        let raw = self.transport.forecast(&request).await?;

        tracing::debug!("forecast stage: {}", ForecastStage::Normalizing);
        let normalized = normalize(&raw)?;

        tracing::debug!("forecast stage: {}", ForecastStage::ComputingRisk);
        let probabilities = exceedance_probabilities(
            &normalized.point_estimates,
            critical_threshold_v,
            &normalized.upper_95,
        )?;

        let points = normalized
            .timestamps
            .iter()
            .zip(&normalized.point_estimates)
            .zip(&normalized.lower_95)
            .zip(&normalized.upper_95)
            .zip(&probabilities)
            .map(
                |((((&timestamp, &point_estimate), &lower_95), &upper_95), &failure_probability)| {
                    ForecastPoint {
                        timestamp,
                        point_estimate,
                        lower_95,
                        upper_95,
                        failure_probability,
                    }
                },
            )
            .collect();
        tracing::debug!("forecast stage: {}", ForecastStage::Done);
        Ok(points)
    }

    fn regular(&self, pairs: &[(DateTime<Utc>, f64)]) -> Vec<(DateTime<Utc>, f64)> {
        drop_missing(regularize(pairs, default_interval(), self.config.max_gap))
    }
}

/// Keep values within `[Q1 - 2*IQR, Q3 + 2*IQR]`. A single spiked sample can
/// destabilize a short-horizon forecast; mild clipping is applied before
/// every call.
fn clip_outliers(pairs: Vec<(DateTime<Utc>, f64)>) -> Vec<(DateTime<Utc>, f64)> {
    let mut sorted: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("series values are finite"));
    if sorted.is_empty() {
        return pairs;
    }
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lo = q1 - IQR_MULTIPLIER * iqr;
    let hi = q3 + IQR_MULTIPLIER * iqr;

    let before = pairs.len();
    let kept: Vec<(DateTime<Utc>, f64)> = pairs
        .into_iter()
        .filter(|(_, v)| (lo..=hi).contains(v))
        .collect();
    if kept.len() < before {
        tracing::debug!(
            "outlier guard dropped {} of {} rows outside [{:.4}, {:.4}]",
            before - kept.len(),
            before,
            lo,
            hi
        );
    }
    kept
}

/// Linear-interpolation percentile over a sorted slice, `p` in `[0, 100]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

/// Keep the first value seen for each timestamp. Input is timestamp-sorted.
fn dedupe_keep_first(pairs: Vec<(DateTime<Utc>, f64)>) -> Vec<(DateTime<Utc>, f64)> {
    let mut out: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        if out.last().map(|(ts, _)| *ts) != Some(pair.0) {
            out.push(pair);
        }
    }
    out
}
