//! Exceedance probability from forecast confidence bounds.

use crate::error::SeriesError;
use statrs::distribution::{ContinuousCDF, Normal};

/// Half-width of a 95% interval in standard deviations under a normal
/// approximation.
const Z_95: f64 = 1.96;

/// Floor for the implied standard deviation; bounds that collapse onto the
/// point estimate must not divide by zero.
const SIGMA_FLOOR: f64 = 1e-6;

/// Elementwise probability that the voltage meets or exceeds `threshold`.
///
/// Each step's standard deviation is implied by its 95% upper bound,
/// `sigma = (upper_95 - mean) / 1.96`, floored at `1e-6`. The exceedance
/// probability is the normal upper tail `1 - Phi((threshold - mean) / sigma)`,
/// clamped to `[0, 1]`.
///
/// Mismatched input lengths are a caller error.
pub fn exceedance_probabilities(
    point_estimates: &[f64],
    threshold: f64,
    upper_95: &[f64],
) -> Result<Vec<f64>, SeriesError> {
    if point_estimates.len() != upper_95.len() {
        return Err(SeriesError::LengthMismatch {
            point_estimates: point_estimates.len(),
            upper_bounds: upper_95.len(),
        });
    }

    let standard_normal = Normal::new(0.0, 1.0).expect("unit normal parameters are valid");
    Ok(point_estimates
        .iter()
        .zip(upper_95)
        .map(|(&mean, &upper)| {
            let sigma = ((upper - mean) / Z_95).max(SIGMA_FLOOR);
            let z = (threshold - mean) / sigma;
            (1.0 - standard_normal.cdf(z)).clamp(0.0, 1.0)
        })
        .collect())
}
