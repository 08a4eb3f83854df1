//! Adapter pipeline exercised through the transport seam.

use async_trait::async_trait;
use cellguard_forecast::{
    ForecastAdapter, ForecastError, ForecastRequest, ForecastStage, ForecastTransport,
    RawForecast, MIN_CONTEXT_MINUTES,
};
use cellguard_core::{VoltagePoint, VoltageSeries};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
}

/// One-minute series oscillating within the given band.
fn oscillating_series(len: usize, low: f64, high: f64) -> VoltageSeries {
    let mid = (low + high) / 2.0;
    let amplitude = (high - low) / 2.0;
    let points = (0..len)
        .map(|m| VoltagePoint {
            timestamp: base_time() + Duration::minutes(m as i64),
            volts: mid + amplitude * (m as f64 / 7.0).sin(),
        })
        .collect();
    VoltageSeries::from_points(points)
}

/// Echoes a plausible provider response: one row per horizon step, named
/// with the provider's own column aliases, bounds a fixed width around the
/// mean of the submitted values.
struct EchoTransport;

#[async_trait]
impl ForecastTransport for EchoTransport {
    async fn forecast(&self, request: &ForecastRequest) -> Result<RawForecast, ForecastError> {
        let last = *request
            .timestamps
            .last()
            .ok_or_else(|| ForecastError::Service("empty request series".into()))?;
        let mean = request.values.iter().sum::<f64>() / request.values.len() as f64;
        let rows = (0..request.horizon)
            .map(|step| {
                let ts = last + Duration::minutes(step as i64 + 1);
                json!({
                    "ds": ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "TimeGPT": mean,
                    "TimeGPT-lo-95": mean - 0.02,
                    "TimeGPT-hi-95": mean + 0.02,
                })
                .as_object()
                .expect("row literal is an object")
                .clone()
            })
            .collect();
        Ok(RawForecast { rows })
    }
}

/// Fails every call the way a quota-exhausted service would.
struct FailingTransport;

#[async_trait]
impl ForecastTransport for FailingTransport {
    async fn forecast(&self, _request: &ForecastRequest) -> Result<RawForecast, ForecastError> {
        Err(ForecastError::Service(
            "forecast service error 429: quota exhausted".into(),
        ))
    }
}

/// Returns rows that are missing the confidence bounds.
struct SparseTransport;

#[async_trait]
impl ForecastTransport for SparseTransport {
    async fn forecast(&self, request: &ForecastRequest) -> Result<RawForecast, ForecastError> {
        let last = *request.timestamps.last().expect("request has points");
        let rows = (0..request.horizon)
            .map(|step| {
                let ts = last + Duration::minutes(step as i64 + 1);
                json!({
                    "ds": ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "yhat": 0.56,
                })
                .as_object()
                .expect("row literal is an object")
                .clone()
            })
            .collect();
        Ok(RawForecast { rows })
    }
}

#[tokio::test]
async fn two_hour_horizon_from_oscillating_series() {
    let series = oscillating_series(200, 0.50, 0.60);
    let adapter = ForecastAdapter::new(Arc::new(EchoTransport));

    let forecast = adapter.forecast(&series, 120, 0.60).await.unwrap();

    assert_eq!(forecast.len(), 120);
    let last_input = series.last().unwrap().timestamp;
    assert_eq!(forecast[0].timestamp, last_input + Duration::minutes(1));
    for window in forecast.windows(2) {
        assert_eq!(
            window[1].timestamp - window[0].timestamp,
            Duration::minutes(1)
        );
    }
    assert!(forecast
        .iter()
        .all(|p| (0.0..=1.0).contains(&p.failure_probability)));
}

#[tokio::test]
async fn short_series_fails_with_exact_count() {
    let series = oscillating_series(45, 0.50, 0.60);
    let adapter = ForecastAdapter::new(Arc::new(EchoTransport));

    let err = adapter.forecast(&series, 120, 0.60).await.unwrap_err();
    match err {
        ForecastError::InsufficientData { actual, required } => {
            assert_eq!(actual, 45);
            assert_eq!(required, MIN_CONTEXT_MINUTES);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[tokio::test]
async fn service_failure_surfaces_verbatim() {
    let series = oscillating_series(200, 0.50, 0.60);
    let adapter = ForecastAdapter::new(Arc::new(FailingTransport));

    let err = adapter.forecast(&series, 120, 0.60).await.unwrap_err();
    assert_eq!(err.stage(), ForecastStage::Calling);
    assert!(format!("{}", err).contains("quota exhausted"));
}

#[tokio::test]
async fn missing_bounds_fail_loudly() {
    let series = oscillating_series(200, 0.50, 0.60);
    let adapter = ForecastAdapter::new(Arc::new(SparseTransport));

    let err = adapter.forecast(&series, 120, 0.60).await.unwrap_err();
    match &err {
        ForecastError::SchemaMismatch { missing } => {
            assert!(missing.contains(&"lower_95".to_string()));
            assert!(missing.contains(&"upper_95".to_string()));
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
    assert_eq!(err.stage(), ForecastStage::Normalizing);
}

#[tokio::test]
async fn spike_is_clipped_before_the_call() {
    // A single 5 V spike in an otherwise tight series must not reach the
    // service; the echo transport folds every submitted value into its mean.
    let mut points: Vec<VoltagePoint> = (0..120)
        .map(|m| VoltagePoint {
            timestamp: base_time() + Duration::minutes(m as i64),
            volts: 0.55,
        })
        .collect();
    points[60].volts = 5.0;
    let series = VoltageSeries::from_points(points);

    let adapter = ForecastAdapter::new(Arc::new(EchoTransport));
    let forecast = adapter.forecast(&series, 10, 0.60).await.unwrap();

    assert!(forecast.iter().all(|p| p.point_estimate < 0.60));
}
