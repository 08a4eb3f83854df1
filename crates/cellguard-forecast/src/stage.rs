use serde::{Deserialize, Serialize};

/// Per-call states of a forecast invocation. Each state can fail terminally;
/// the adapter never retries on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastStage {
    /// Re-regularizing the input and checking the context minimum.
    Validating,
    /// Outlier clipping, de-duplication, and gap re-fill.
    Cleaning,
    /// The single I/O boundary: the external forecasting service call.
    Calling,
    /// Mapping response field names onto the canonical schema.
    Normalizing,
    /// Deriving failure probabilities from the confidence bounds.
    ComputingRisk,
    Done,
}

impl std::fmt::Display for ForecastStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Cleaning => write!(f, "cleaning"),
            Self::Calling => write!(f, "calling"),
            Self::Normalizing => write!(f, "normalizing"),
            Self::ComputingRisk => write!(f, "computing-risk"),
            Self::Done => write!(f, "done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display() {
        assert_eq!(format!("{}", ForecastStage::Validating), "validating");
        assert_eq!(format!("{}", ForecastStage::ComputingRisk), "computing-risk");
    }
}
