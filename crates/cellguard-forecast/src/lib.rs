//! # cellguard-forecast
//!
//! Forecast adapter for prepared cell-voltage series: validates and cleans
//! the input, invokes the external forecasting service through a pluggable
//! transport, normalizes the response schema, and attaches calibrated
//! failure probabilities to every forecast step.
//!
//! The service call is the single I/O boundary; everything around it is
//! deterministic. There is no fallback to synthetic forecasts: a service
//! failure surfaces to the caller verbatim.

pub mod adapter;
pub mod error;
pub mod normalize;
pub mod stage;
pub mod transport;

pub use adapter::{AdapterConfig, ForecastAdapter, MIN_CONTEXT_MINUTES};
pub use error::ForecastError;
pub use normalize::{normalize, NormalizedForecast};
pub use stage::ForecastStage;
pub use transport::{
    ForecastRequest, ForecastTransport, HttpForecastTransport, RawForecast, AUTH_ENV_VAR,
    DEFAULT_ENDPOINT,
};
