//! lastseen.change.v1 record definition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "lastseen.change.v1";

/// One record of the last-seen change log, as returned by the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    /// When the presence value was captured (any RFC 3339 offset, stored as UTC)
    pub captured_at: DateTime<Utc>,
    /// The last-seen value reported at that capture
    pub last_seen_at: DateTime<Utc>,
}

impl RawObservation {
    pub fn new(captured_at: DateTime<Utc>, last_seen_at: DateTime<Utc>) -> Self {
        Self {
            captured_at,
            last_seen_at,
        }
    }

    /// Validate the record.
    ///
    /// A last-seen value later than its own capture is accepted by the
    /// pipeline (its age clamps to zero) but reported here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.last_seen_at > self.captured_at {
            return Err(ValidationError::LastSeenAfterCapture {
                captured_at: self.captured_at.to_rfc3339(),
                last_seen_at: self.last_seen_at.to_rfc3339(),
            });
        }
        Ok(())
    }
}

/// Validation errors for raw records
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("last_seen_at {last_seen_at} is after captured_at {captured_at}")]
    LastSeenAfterCapture {
        captured_at: String,
        last_seen_at: String,
    },
}
