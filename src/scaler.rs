//! Vertical axis scaling
//!
//! The axis bound follows the 90th percentile of in-window staleness, padded by
//! [`AXIS_HEADROOM`] minutes and snapped to a 5-minute grid within `[15, 180]`.
//! Discrete steps keep the axis from flickering while panning.

use crate::config::{AXIS_HEADROOM, AXIS_MAX, AXIS_MIN, AXIS_STEP, P90_QUANTILE};
use crate::types::Sample;

/// Nearest-rank percentile: sort ascending, take index `floor(q * (n - 1))`.
///
/// Returns 0 for empty input. Non-finite values are ignored.
pub fn percentile(values: &[f64], quantile: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);
    let idx = (quantile.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn p90(values: &[f64]) -> f64 {
    percentile(values, P90_QUANTILE)
}

/// Round up to the axis grid and clamp to the axis limits
fn snap(value: f64) -> u32 {
    let step = f64::from(AXIS_STEP);
    let snapped = (value / step).ceil() * step;
    snapped.clamp(f64::from(AXIS_MIN), f64::from(AXIS_MAX)) as u32
}

/// Symmetric axis bound for a set of ages in minutes
pub fn signed_max(values: &[f64]) -> u32 {
    let y_max = snap(p90(values) + AXIS_HEADROOM);
    // idempotent
    snap(f64::from(y_max))
}

/// Axis bound for the defined samples in a window
pub fn signed_max_for(samples: &[Sample]) -> u32 {
    let ages: Vec<f64> = samples.iter().filter_map(|s| s.age_minutes).collect();
    signed_max(&ages)
}
