//! Real-time reading simulator.
//!
//! Stands in for the live sensor feed: one new reading per minute, a small
//! Gaussian step from the previous value, clamped to the operating band.

use crate::types::{SimulatorConfig, VoltagePoint, VoltageSeries};
use chrono::Duration;
use rand_distr::{Distribution, Normal};

/// Append one simulated reading to the series, one minute after its last
/// point. Returns a new series; the input is never mutated. An empty series
/// has no value to step from and is returned unchanged.
pub fn append_simulated_reading(
    series: &VoltageSeries,
    config: &SimulatorConfig,
) -> VoltageSeries {
    let Some(last) = series.last().copied() else {
        return series.clone();
    };

    let noise = match Normal::new(0.0, config.noise_sigma_v) {
        Ok(dist) => dist.sample(&mut rand::thread_rng()),
        Err(_) => 0.0,
    };
    let volts = (last.volts + noise).clamp(config.min_volts, config.max_volts);

    let mut points = series.points().to_vec();
    points.push(VoltagePoint {
        timestamp: last.timestamp + Duration::minutes(1),
        volts,
    });
    VoltageSeries::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series_of(values: &[f64]) -> VoltageSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &volts)| VoltagePoint {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, i as u32, 0).unwrap(),
                volts,
            })
            .collect();
        VoltageSeries::from_points(points)
    }

    #[test]
    fn appends_one_minute_after_last() {
        let input = series_of(&[0.55, 0.56]);
        let out = append_simulated_reading(&input, &SimulatorConfig::default());
        assert_eq!(out.len(), 3);
        assert_eq!(
            out.last().unwrap().timestamp,
            input.last().unwrap().timestamp + Duration::minutes(1)
        );
        // Input untouched.
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn stays_within_operating_band() {
        let config = SimulatorConfig::default();
        let mut series = series_of(&[0.70]);
        for _ in 0..50 {
            series = append_simulated_reading(&series, &config);
        }
        assert!(series
            .values()
            .iter()
            .all(|&v| (config.min_volts..=config.max_volts).contains(&v)));
    }

    #[test]
    fn zero_noise_repeats_last_value() {
        let config = SimulatorConfig {
            noise_sigma_v: 0.0,
            ..SimulatorConfig::default()
        };
        let out = append_simulated_reading(&series_of(&[0.56]), &config);
        assert_eq!(out.last().unwrap().volts, 0.56);
    }

    #[test]
    fn empty_series_is_unchanged() {
        let out = append_simulated_reading(&VoltageSeries::default(), &SimulatorConfig::default());
        assert!(out.is_empty());
    }
}
