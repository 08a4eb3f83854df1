//! The transport seam to the external forecasting service.
//!
//! The adapter only knows [`ForecastTransport`]; the bundled
//! [`HttpForecastTransport`] speaks the hosted service's JSON API. Tests plug
//! in their own implementations.

use crate::error::ForecastError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Environment variable holding the forecasting service API key.
pub const AUTH_ENV_VAR: &str = "CELLGUARD_FORECAST_API_KEY";

/// Default service base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.nixtla.io";

const REQUEST_TIMEOUT_SECS: u64 = 60;
const ERROR_BODY_LIMIT: usize = 320;

/// Request handed to the forecasting capability: the cleaned series, the
/// horizon length in steps, the cadence, and the requested confidence level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub series_id: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
    pub horizon: u32,
    pub freq: String,
    pub confidence_levels: Vec<u8>,
}

/// Un-normalized response rows. Field names vary by provider and model
/// version; [`crate::normalize`] maps them onto the canonical schema.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawForecast {
    pub rows: Vec<Map<String, Value>>,
}

/// The single I/O boundary of the pipeline.
#[async_trait]
pub trait ForecastTransport: Send + Sync {
    async fn forecast(&self, request: &ForecastRequest) -> Result<RawForecast, ForecastError>;

    /// Startup probe for credential validity, so callers fail fast instead
    /// of discovering a bad key on the first forecast. Defaults to a no-op
    /// for transports without credentials.
    async fn validate_credentials(&self) -> Result<(), ForecastError> {
        Ok(())
    }
}

/// HTTP transport for the hosted forecasting service.
///
/// The API key is read from [`AUTH_ENV_VAR`] at construction; a missing or
/// empty key is a hard startup failure, never a per-call condition.
pub struct HttpForecastTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpForecastTransport {
    pub fn from_env() -> Result<Self, ForecastError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ForecastError> {
        let api_key = std::env::var(AUTH_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ForecastError::MissingCredential(format!(
                    "set {} to your forecasting service API key",
                    AUTH_ENV_VAR
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ForecastError::Service(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.endpoint.trim_end_matches('/'))
    }

    fn validate_url(&self) -> String {
        format!("{}/validate_token", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl ForecastTransport for HttpForecastTransport {
    async fn forecast(&self, request: &ForecastRequest) -> Result<RawForecast, ForecastError> {
        let payload = json!({
            "series": {
                "unique_id": request.series_id,
                "timestamps": request.timestamps,
                "values": request.values,
            },
            "h": request.horizon,
            "freq": request.freq,
            "level": request.confidence_levels,
        });

        let response = self
            .client
            .post(self.forecast_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ForecastError::Service(format!("forecast request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::Service(format!(
                "forecast service error {}: {}",
                status,
                truncate(&body, ERROR_BODY_LIMIT)
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ForecastError::Service(format!("invalid forecast response: {}", e)))?;

        let rows = body
            .get("forecast")
            .and_then(Value::as_array)
            .or_else(|| body.as_array())
            .ok_or_else(|| {
                ForecastError::Service("forecast response is not a row array".to_string())
            })?;

        let rows = rows
            .iter()
            .map(|row| {
                row.as_object().cloned().ok_or_else(|| {
                    ForecastError::Service("forecast row is not an object".to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RawForecast { rows })
    }

    async fn validate_credentials(&self) -> Result<(), ForecastError> {
        let response = self
            .client
            .post(self.validate_url())
            .bearer_auth(&self.api_key)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| ForecastError::Service(format!("validation request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ForecastError::MissingCredential(
                "forecast service rejected the configured API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::Service(format!(
                "credential validation error {}: {}",
                status,
                truncate(&body, ERROR_BODY_LIMIT)
            )));
        }
        Ok(())
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
