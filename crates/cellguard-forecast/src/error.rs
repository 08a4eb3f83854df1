use crate::stage::ForecastStage;
use cellguard_core::SeriesError;
use thiserror::Error;

/// Errors terminating a forecast invocation. All are fatal for the call;
/// none fall back to synthetic data.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("missing forecast service credential: {0}")]
    MissingCredential(String),

    #[error("insufficient samples ({actual}) after cleaning; need at least {required} minutes")]
    InsufficientData { actual: usize, required: usize },

    #[error("forecast response missing fields: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("forecast service error: {0}")]
    Service(String),

    #[error(transparent)]
    Series(#[from] SeriesError),
}

impl ForecastError {
    /// The pipeline stage at which this error terminates the call.
    pub fn stage(&self) -> ForecastStage {
        match self {
            Self::MissingCredential(_) | Self::InsufficientData { .. } => ForecastStage::Validating,
            Self::Service(_) => ForecastStage::Calling,
            Self::SchemaMismatch { .. } => ForecastStage::Normalizing,
            Self::Series(_) => ForecastStage::ComputingRisk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_reports_count() {
        let e = ForecastError::InsufficientData {
            actual: 42,
            required: 60,
        };
        let msg = format!("{}", e);
        assert!(msg.contains("42"));
        assert!(msg.contains("60"));
        assert_eq!(e.stage(), ForecastStage::Validating);
    }

    #[test]
    fn schema_mismatch_lists_fields() {
        let e = ForecastError::SchemaMismatch {
            missing: vec!["upper_95".into(), "lower_95".into()],
        };
        let msg = format!("{}", e);
        assert!(msg.contains("upper_95"));
        assert!(msg.contains("lower_95"));
        assert_eq!(e.stage(), ForecastStage::Normalizing);
    }

    #[test]
    fn service_message_is_preserved() {
        let e = ForecastError::Service("quota exhausted".into());
        assert!(format!("{}", e).contains("quota exhausted"));
        assert_eq!(e.stage(), ForecastStage::Calling);
    }
}
