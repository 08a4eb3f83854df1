#![deny(unsafe_code)]
//! # cellguard-core
//!
//! Data preparation and failure-risk primitives for electrolyzer cell-voltage
//! monitoring:
//!
//! - **Ingestion**: tabular sensor input with configurable column names
//! - **Window extraction**: last operating streak with backward context,
//!   millivolt/volt normalization
//! - **Regularization**: strict one-minute cadence with bounded gap fill
//! - **Risk**: exceedance probability from forecast confidence bounds
//! - **Simulation**: one-minute Gaussian stand-in for the live feed
//!
//! Everything here is pure and synchronous; the forecasting service boundary
//! lives in `cellguard-forecast`.

pub mod error;
pub mod ingest;
pub mod regularize;
pub mod risk;
pub mod simulate;
pub mod types;
pub mod window;

pub use error::SeriesError;
pub use ingest::read_readings;
pub use regularize::{default_interval, drop_missing, regularize, GridSlot, DEFAULT_MAX_GAP};
pub use risk::exceedance_probabilities;
pub use simulate::append_simulated_reading;
pub use types::{
    ColumnSpec, ForecastPoint, RawReading, SimulatorConfig, VoltagePoint, VoltageSeries,
    WindowConfig,
};
pub use window::WindowExtractor;
