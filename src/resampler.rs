//! Fixed-step resampling
//!
//! Produces one [`Sample`] every `step_ms` across an inclusive range by
//! carrying the most recent last-seen value forward (step interpolation).
//! Samples before the first capture have no age: they render as gaps, which
//! keeps "no data yet" distinct from "fully stale".

use crate::config::MAX_SAMPLES;
use crate::types::{Observation, Sample, TimeRange};
use tracing::{debug, warn};

const MS_PER_MINUTE: i64 = 60_000;

/// Resampler over a normalized (sorted) observation list
pub struct Resampler;

impl Resampler {
    /// Resample `observations` at `from, from + step, …` up to and including `to`.
    ///
    /// Returns an empty list for empty input, a non-positive step, or a series
    /// that would exceed [`MAX_SAMPLES`].
    pub fn resample(observations: &[Observation], range: TimeRange, step_ms: i64) -> Vec<Sample> {
        let Some(first) = observations.first() else {
            return Vec::new();
        };
        if step_ms <= 0 {
            return Vec::new();
        }

        // Cursor: index of the last observation captured at or before `t`
        let mut cursor = 0;
        while cursor + 1 < observations.len() && observations[cursor + 1].captured_at <= range.from {
            cursor += 1;
        }

        let steps = range.len_ms() / step_ms;
        if steps >= MAX_SAMPLES as i64 {
            warn!(
                span_ms = range.len_ms(),
                step_ms,
                max_samples = MAX_SAMPLES,
                "resampling span too long; skipping"
            );
            return Vec::new();
        }
        let mut samples = Vec::with_capacity(steps as usize + 1);
        let mut t = range.from;

        while t <= range.to {
            while cursor + 1 < observations.len() && observations[cursor + 1].captured_at <= t {
                cursor += 1;
            }
            let last_seen_at = observations[cursor].last_seen_at;
            let age_minutes = if t < first.captured_at {
                None
            } else {
                Some(age_minutes(t, last_seen_at))
            };
            samples.push(Sample {
                t,
                age_minutes,
                last_seen_at,
            });

            match t.checked_add(step_ms) {
                Some(next) => t = next,
                None => break,
            }
        }

        debug!(
            observations = observations.len(),
            samples = samples.len(),
            "resampled staleness series"
        );
        samples
    }
}

/// Whole minutes elapsed from `last_seen_at` to `t`, floored and never negative
pub fn age_minutes(t: i64, last_seen_at: i64) -> f64 {
    t.saturating_sub(last_seen_at).div_euclid(MS_PER_MINUTE).max(0) as f64
}
