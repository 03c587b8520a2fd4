//! Jitter and hysteresis suppression
//!
//! One left-to-right pass that keeps a subsequence of the resampled series:
//! - a sample whose age moved less than `jitter_minutes` from the last kept
//!   sample is dropped
//! - a sample that changes bucket less than `hysteresis_ms` after the last
//!   kept sample is dropped, so a single sample cannot flicker across a boundary
//!
//! The first defined sample is always kept. Samples are never reordered or
//! synthesized.

use crate::config::{TimelineConfig, HYSTERESIS_MS, JITTER_MINUTES};
use crate::types::{Bucket, Sample};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stabilizer {
    pub jitter_minutes: f64,
    pub hysteresis_ms: i64,
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self {
            jitter_minutes: JITTER_MINUTES,
            hysteresis_ms: HYSTERESIS_MS,
        }
    }
}

impl Stabilizer {
    pub fn from_config(config: &TimelineConfig) -> Self {
        Self {
            jitter_minutes: config.jitter_minutes,
            hysteresis_ms: config.hysteresis_ms,
        }
    }

    /// Stabilize a resampled series. Undefined samples are skipped.
    pub fn stabilize(&self, samples: &[Sample]) -> Vec<Sample> {
        let mut kept: Vec<Sample> = Vec::with_capacity(samples.len());
        let mut prev: Option<(Sample, f64)> = None;

        for cur in samples {
            let Some(age) = cur.age_minutes else {
                continue;
            };

            if let Some((prev_sample, prev_age)) = prev {
                if (age - prev_age).abs() < self.jitter_minutes {
                    continue;
                }
                let crosses = Bucket::from_minutes(age) != Bucket::from_minutes(prev_age);
                if crosses && cur.t - prev_sample.t < self.hysteresis_ms {
                    continue;
                }
            }

            kept.push(*cur);
            prev = Some((*cur, age));
        }

        debug!(input = samples.len(), kept = kept.len(), "stabilized series");
        kept
    }
}
