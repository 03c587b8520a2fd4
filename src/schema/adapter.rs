//! Adapter from lastseen.change.v1 records to pipeline observations

use crate::error::ComputeError;
use crate::schema::raw_event::*;
use crate::types::{Observation, TimeRange};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Adapter for converting raw records to observations
pub struct RawObservationAdapter;

impl RawObservationAdapter {
    /// Parse a JSON array of records
    pub fn parse_array(json: &str) -> Result<Vec<RawObservation>, ComputeError> {
        let records: Vec<RawObservation> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (one record per line).
    ///
    /// A single malformed line rejects the whole snapshot.
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawObservation>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawObservation>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Convert records to millisecond observations, preserving input order
    pub fn to_observations(records: &[RawObservation]) -> Vec<Observation> {
        let observations: Vec<Observation> = records
            .iter()
            .map(|r| {
                Observation::new(r.captured_at.timestamp_millis(), r.last_seen_at.timestamp_millis())
            })
            .collect();
        debug!(count = observations.len(), "converted raw records");
        observations
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[RawObservation]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| ValidationResult {
                index: idx,
                result: record.validate().err(),
            })
            .filter(|r| r.result.is_some())
            .collect()
    }
}

/// Result of record validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub result: Option<ValidationError>,
}

/// Parse an RFC 3339 timestamp into epoch milliseconds
pub fn parse_instant(iso: &str) -> Result<i64, ComputeError> {
    DateTime::parse_from_rfc3339(iso.trim())
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
        .map_err(|e| ComputeError::DateParseError(format!("{}: {}", iso, e)))
}

/// Parse an ISO query range such as the one passed to the data source
pub fn parse_range(from_iso: &str, to_iso: &str) -> Result<TimeRange, ComputeError> {
    TimeRange::new(parse_instant(from_iso)?, parse_instant(to_iso)?)
}

/// Format epoch milliseconds as RFC 3339 UTC, if representable
pub fn format_instant(ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339())
}
