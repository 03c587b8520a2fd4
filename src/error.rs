//! Error types for Lastseen Timeline

use thiserror::Error;

/// Errors that can occur at the boundary of the timeline pipeline.
///
/// The pipeline stages themselves are total; these only surface while parsing
/// boundary records, resolving the query range or timezone, loading
/// configuration, or encoding output.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse observations: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid range: from {from} is after to {to}")]
    InvalidRange { from: i64, to: i64 },

    #[error("Range from {from} to {to} is longer than {max_days} days")]
    RangeTooLong { from: i64, to: i64, max_days: i64 },

    #[error("Unsupported window width: {0}h (expected 6, 24, 72 or 168)")]
    UnsupportedWindowWidth(u32),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
