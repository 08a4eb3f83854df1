//! Fixed-cadence resampling with bounded gap fill.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Largest run of consecutive missing slots that linear interpolation fills.
pub const DEFAULT_MAX_GAP: usize = 5;

/// The pipeline cadence: one minute.
pub fn default_interval() -> Duration {
    Duration::minutes(1)
}

/// One slot of the regular grid. `value` is `None` where no reading landed
/// and the surrounding gap was too long to fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSlot {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Resample a timestamped series onto a strict fixed-interval grid.
///
/// Timestamps are floored to the grid, duplicate readings within a slot are
/// averaged, and interior gap runs of at most `max_gap` missing slots are
/// filled by linear interpolation between their known neighbors. Longer runs
/// stay `None` so callers drop them instead of fabricating values across a
/// sensor outage. Regularizing an already-regular series returns it
/// unchanged.
pub fn regularize(
    points: &[(DateTime<Utc>, f64)],
    interval: Duration,
    max_gap: usize,
) -> Vec<GridSlot> {
    if points.is_empty() {
        return Vec::new();
    }
    let step = interval.num_seconds().max(1);

    // Bucket to the grid, averaging collisions.
    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (timestamp, value) in points {
        let key = timestamp.timestamp().div_euclid(step) * step;
        let entry = buckets.entry(key).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let first = *buckets.keys().next().expect("buckets are non-empty");
    let last = *buckets.keys().next_back().expect("buckets are non-empty");

    let mut values: Vec<Option<f64>> = Vec::with_capacity(((last - first) / step + 1) as usize);
    let mut secs = first;
    while secs <= last {
        values.push(buckets.get(&secs).map(|(sum, count)| sum / *count as f64));
        secs += step;
    }

    fill_small_gaps(&mut values, max_gap);

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| GridSlot {
            timestamp: DateTime::from_timestamp(first + i as i64 * step, 0)
                .expect("grid seconds are within range"),
            value,
        })
        .collect()
}

/// Drop empty slots, keeping the timestamps of the survivors.
pub fn drop_missing(slots: Vec<GridSlot>) -> Vec<(DateTime<Utc>, f64)> {
    slots
        .into_iter()
        .filter_map(|slot| slot.value.map(|v| (slot.timestamp, v)))
        .collect()
}

fn fill_small_gaps(values: &mut [Option<f64>], max_gap: usize) {
    let mut i = 0;
    while i < values.len() {
        if values[i].is_some() {
            i += 1;
            continue;
        }
        let gap_start = i;
        while i < values.len() && values[i].is_none() {
            i += 1;
        }
        let gap_len = i - gap_start;
        // The grid spans occupied slots, so a gap always has a known slot on
        // each side unless it touches the edges, which cannot happen here.
        if gap_len > max_gap || gap_start == 0 || i == values.len() {
            continue;
        }
        let prev = values[gap_start - 1].expect("slot before gap is known");
        let next = values[i].expect("slot after gap is known");
        for (offset, slot) in values[gap_start..gap_start + gap_len].iter_mut().enumerate() {
            let fraction = (offset + 1) as f64 / (gap_len + 1) as f64;
            *slot = Some(prev + (next - prev) * fraction);
        }
    }
}
