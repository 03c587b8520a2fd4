//! Pipeline configuration
//!
//! One canonical set of constants shared by every stage, plus a serde-backed
//! [`TimelineConfig`] so deployments can override them from JSON or TOML.

use crate::error::ComputeError;
use crate::types::{MaskStrategy, WindowWidth};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Resampling step (5 minutes)
pub const SAMPLE_STEP_MS: i64 = 300_000;

/// Smallest accepted resampling step (1 min)
pub const MIN_SAMPLE_STEP_MS: i64 = 60_000;

/// Longest accepted query range (366 days)
pub const MAX_RANGE_MS: i64 = 366 * 86_400_000;

/// Upper bound on samples per resampling pass
pub const MAX_SAMPLES: usize = (MAX_RANGE_MS / MIN_SAMPLE_STEP_MS) as usize + 1;

/// Age changes below this many minutes are treated as unchanged
pub const JITTER_MINUTES: f64 = 0.5;

/// A bucket transition must persist this long before it is accepted (90 s)
pub const HYSTERESIS_MS: i64 = 90_000;

/// Minimum forward jump of the last-seen value to count as an entrance (4 min)
pub const ENTRANCE_JUMP_MIN_MS: i64 = 240_000;

/// Maximum age at capture for an entrance to count as fresh (20 min)
pub const ENTRANCE_FRESH_MAX_MS: i64 = 1_200_000;

/// Upper (inclusive) bucket boundaries in minutes
pub const FRESH_MAX_MINUTES: f64 = 15.0;
pub const WARM_MAX_MINUTES: f64 = 30.0;
pub const STALE_MAX_MINUTES: f64 = 60.0;

/// Vertical axis limits and grid, in minutes
pub const AXIS_MIN: u32 = 15;
pub const AXIS_MAX: u32 = 180;
pub const AXIS_STEP: u32 = 5;
pub const AXIS_HEADROOM: f64 = 10.0;

/// Quantile driving the vertical axis
pub const P90_QUANTILE: f64 = 0.9;

/// Pan step of the back/forward controls (1 h)
pub const PAN_STEP_MS: i64 = 3_600_000;

/// Pan step per wheel notch (30 min)
pub const WHEEL_STEP_MS: i64 = 1_800_000;

/// Default query range length ending now
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// Civil timezone used for hour-of-day bucketing
pub const DEFAULT_TIMEZONE: &str = "Europe/Kyiv";

/// Offset of a synthetic closing point before a transition (ms)
pub const CLOSE_EPSILON_MS: i64 = 1;

/// Margin keeping closing values off an open lower boundary (minutes)
pub const CLOSE_EPSILON_MINUTES: f64 = 0.01;

/// Tunable pipeline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub sample_step_ms: i64,
    pub jitter_minutes: f64,
    pub hysteresis_ms: i64,
    pub entrance_jump_min_ms: i64,
    pub entrance_fresh_max_ms: i64,
    /// IANA timezone name, e.g. "Europe/Kyiv"
    pub timezone: String,
    pub mask_strategy: MaskStrategy,
    pub default_width: WindowWidth,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            sample_step_ms: SAMPLE_STEP_MS,
            jitter_minutes: JITTER_MINUTES,
            hysteresis_ms: HYSTERESIS_MS,
            entrance_jump_min_ms: ENTRANCE_JUMP_MIN_MS,
            entrance_fresh_max_ms: ENTRANCE_FRESH_MAX_MS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            mask_strategy: MaskStrategy::default(),
            default_width: WindowWidth::default(),
        }
    }
}

impl TimelineConfig {
    /// Same defaults, different timezone
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ComputeError> {
        let config: Self =
            toml::from_str(text).map_err(|e| ComputeError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file, chosen by extension
    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ComputeError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json(&text),
            other => Err(ComputeError::ConfigError(format!(
                "unsupported config extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Resolve the configured timezone
    pub fn tz(&self) -> Result<Tz, ComputeError> {
        parse_timezone(&self.timezone)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        let problem = if self.sample_step_ms < MIN_SAMPLE_STEP_MS {
            Some(format!(
                "sample_step_ms must be at least {}, got {}",
                MIN_SAMPLE_STEP_MS, self.sample_step_ms
            ))
        } else if self.jitter_minutes.is_nan() || self.jitter_minutes < 0.0 {
            Some(format!("jitter_minutes must be >= 0, got {}", self.jitter_minutes))
        } else if self.hysteresis_ms < 0 {
            Some(format!("hysteresis_ms must be >= 0, got {}", self.hysteresis_ms))
        } else if self.entrance_jump_min_ms < 0 || self.entrance_fresh_max_ms < 0 {
            Some("entrance thresholds must be >= 0".to_string())
        } else {
            None
        };

        if let Some(msg) = problem {
            warn!(%msg, "rejecting timeline config");
            return Err(ComputeError::ConfigError(msg));
        }

        self.tz().map(|_| ())
    }
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ComputeError> {
    name.parse::<Tz>()
        .map_err(|_| ComputeError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_named_constants() {
        let config = TimelineConfig::default();
        assert_eq!(config.sample_step_ms, SAMPLE_STEP_MS);
        assert_eq!(config.jitter_minutes, JITTER_MINUTES);
        assert_eq!(config.hysteresis_ms, HYSTERESIS_MS);
        assert_eq!(config.entrance_jump_min_ms, ENTRANCE_JUMP_MIN_MS);
        assert_eq!(config.entrance_fresh_max_ms, ENTRANCE_FRESH_MAX_MS);
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_constant_values() {
        assert_eq!(SAMPLE_STEP_MS, 5 * 60_000);
        assert_eq!(HYSTERESIS_MS, 90 * 1000);
        assert_eq!(ENTRANCE_JUMP_MIN_MS, 4 * 60_000);
        assert_eq!(ENTRANCE_FRESH_MAX_MS, 20 * 60_000);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = TimelineConfig::from_json(r#"{"timezone": "UTC", "default_width": 24}"#).unwrap();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.default_width, WindowWidth::Day);
        assert_eq!(config.sample_step_ms, SAMPLE_STEP_MS);
    }

    #[test]
    fn test_toml_config() {
        let text = r#"
            sample_step_ms = 60000
            timezone = "America/New_York"
            mask_strategy = "exclusive"
        "#;
        let config = TimelineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.sample_step_ms, 60_000);
        assert_eq!(config.mask_strategy, MaskStrategy::Exclusive);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            TimelineConfig::from_json(r#"{"sample_step_ms": 0}"#),
            Err(ComputeError::ConfigError(_))
        ));
        assert!(matches!(
            TimelineConfig::from_toml_str("sample_step_ms = 1"),
            Err(ComputeError::ConfigError(_))
        ));
        assert!(matches!(
            TimelineConfig::from_json(r#"{"timezone": "Mars/Olympus"}"#),
            Err(ComputeError::InvalidTimezone(_))
        ));
        assert!(TimelineConfig::from_json(r#"{"default_width": 12}"#).is_err());
    }
}
