//! Event normalization
//!
//! This module turns the raw change log into the canonical observation list:
//! - Timestamps converted to epoch milliseconds
//! - Sorted ascending by capture time (stable, so equal captures keep source order)
//! - Nothing dropped, deduplicated or interpolated; the source is ground truth

use crate::schema::{RawObservation, RawObservationAdapter};
use crate::types::Observation;
use tracing::debug;

/// Normalizer for converting the raw log to sorted observations
pub struct Normalizer;

impl Normalizer {
    /// Convert and sort boundary records
    pub fn normalize_records(records: &[RawObservation]) -> Vec<Observation> {
        Self::normalize(&RawObservationAdapter::to_observations(records))
    }

    /// Sort observations by `captured_at`
    pub fn normalize(observations: &[Observation]) -> Vec<Observation> {
        let mut sorted = observations.to_vec();
        sorted.sort_by_key(|o| o.captured_at);
        debug!(count = sorted.len(), "normalized observations");
        sorted
    }
}
