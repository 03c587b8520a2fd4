//! Entrance detection
//!
//! Works on the raw, sorted observation log (not the resampled series). An
//! entrance is a pair `(prev, cur)` where the last-seen value jumped forward by
//! at least `jump_min_ms` and `cur` caught it while no older than
//! `fresh_max_ms`. Entrances are counted per hour of day in a civil timezone.

use crate::config::{TimelineConfig, ENTRANCE_FRESH_MAX_MS, ENTRANCE_JUMP_MIN_MS};
use crate::error::ComputeError;
use crate::types::{EntranceEvent, EntranceSummary, HourCount, Observation};
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;
use tracing::debug;

const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceDetector {
    tz: Tz,
    jump_min_ms: i64,
    fresh_max_ms: i64,
}

impl EntranceDetector {
    /// Detector with the default thresholds
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            jump_min_ms: ENTRANCE_JUMP_MIN_MS,
            fresh_max_ms: ENTRANCE_FRESH_MAX_MS,
        }
    }

    pub fn from_config(config: &TimelineConfig) -> Result<Self, ComputeError> {
        Ok(Self {
            tz: config.tz()?,
            jump_min_ms: config.entrance_jump_min_ms,
            fresh_max_ms: config.entrance_fresh_max_ms,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// All qualifying entrances, in capture order
    pub fn detect(&self, observations: &[Observation]) -> Vec<EntranceEvent> {
        observations
            .windows(2)
            .filter_map(|pair| {
                let (prev, cur) = (pair[0], pair[1]);
                let jump_forward = cur.last_seen_at - prev.last_seen_at;
                if jump_forward >= self.jump_min_ms && cur.age_ms() <= self.fresh_max_ms {
                    self.hour_of(cur.last_seen_at).map(|hour_of_day| EntranceEvent {
                        at_last_seen: cur.last_seen_at,
                        hour_of_day,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Latest last-seen value among observations captured while still fresh.
    ///
    /// Independent of the jump rule, so the first sighting in a log counts too.
    pub fn last_entrance(&self, observations: &[Observation]) -> Option<i64> {
        observations
            .iter()
            .filter(|o| o.age_ms() <= self.fresh_max_ms)
            .map(|o| o.last_seen_at)
            .max()
    }

    /// Zero-filled hourly histogram plus the most recent entrance
    pub fn summarize(&self, observations: &[Observation]) -> EntranceSummary {
        let events = self.detect(observations);
        let mut counts = [0u32; HOURS_PER_DAY];
        for event in &events {
            counts[event.hour_of_day as usize] += 1;
        }

        debug!(
            observations = observations.len(),
            entrances = events.len(),
            tz = self.tz.name(),
            "detected entrances"
        );

        EntranceSummary {
            entries_by_hour: counts
                .iter()
                .enumerate()
                .map(|(hour, count)| HourCount {
                    hour: hour as u32,
                    count: *count,
                })
                .collect(),
            last_entrance_at: self.last_entrance(observations),
        }
    }

    fn hour_of(&self, ms: i64) -> Option<u32> {
        DateTime::from_timestamp_millis(ms).map(|dt| dt.with_timezone(&self.tz).hour())
    }
}
