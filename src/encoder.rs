//! Timeline payload encoding
//!
//! This module encodes a [`TimelineFrame`] into the camelCase payload the
//! rendering layer consumes. The payload carries no wall-clock fields, so the
//! same frame always encodes to the same bytes.

use crate::error::ComputeError;
use crate::types::{PayloadProducer, TimelineFrame, TimelinePayload, WirePoint};
use crate::{PRODUCER_NAME, TIMELINE_VERSION};

/// Output schema version
pub const PAYLOAD_SCHEMA_VERSION: &str = "lastseen.timeline.v1";

/// Encoder producing rendering payloads
#[derive(Debug, Clone, Default)]
pub struct FrameEncoder;

impl FrameEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a frame into a payload
    pub fn encode(&self, frame: &TimelineFrame) -> TimelinePayload {
        let wire = |points: &[crate::types::BandPoint]| -> Vec<WirePoint> {
            points.iter().map(WirePoint::from).collect()
        };

        TimelinePayload {
            schema_version: PAYLOAD_SCHEMA_VERSION.to_string(),
            producer: PayloadProducer {
                name: PRODUCER_NAME.to_string(),
                version: TIMELINE_VERSION.to_string(),
            },
            generation: frame.generation,
            visible_from: frame.axis.visible_from,
            visible_to: frame.axis.visible_to,
            signed_max: frame.axis.signed_max,
            tick_format: frame.axis.tick_format.clone(),
            tick_count: frame.axis.tick_count,
            overview: wire(&frame.overview),
            fresh: wire(&frame.bands.fresh),
            warm: wire(&frame.bands.warm),
            stale: wire(&frame.bands.stale),
            cold: wire(&frame.bands.cold),
            entries_by_hour: frame.entrances.entries_by_hour.clone(),
            last_entrance_at: frame.entrances.last_entrance_at,
            observations_count: frame.kpis.observations_count,
            latest_last_seen_at: frame.kpis.latest_last_seen_at,
            latest_age_minutes: frame.kpis.latest_age_minutes,
        }
    }

    /// Encode to compact JSON
    pub fn encode_to_json(&self, frame: &TimelineFrame) -> Result<String, ComputeError> {
        serde_json::to_string(&self.encode(frame)).map_err(ComputeError::JsonError)
    }

    /// Encode to indented JSON
    pub fn encode_to_json_pretty(&self, frame: &TimelineFrame) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(&self.encode(frame)).map_err(ComputeError::JsonError)
    }
}
