use thiserror::Error;

/// Errors from series ingestion and preparation.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("column '{0}' not found in input header")]
    MissingColumn(String),

    #[error("no usable voltage data: {0}")]
    NoUsableData(String),

    #[error("length mismatch: {point_estimates} point estimates vs {upper_bounds} upper bounds")]
    LengthMismatch {
        point_estimates: usize,
        upper_bounds: usize,
    },

    #[error("malformed input file: {0}")]
    Csv(#[from] csv::Error),
}
