//! Headline KPIs and point readouts
//!
//! KPIs come from the raw log: how many observations the snapshot holds, the
//! latest last-seen value and its age at the latest capture. A point readout
//! is what a tooltip shows for one plotted value.

use crate::types::{Bucket, Kpis, Observation};
use serde::{Deserialize, Serialize};

const MS_PER_MINUTE: f64 = 60_000.0;

/// Age at capture time, rounded to whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgePoint {
    pub t: i64,
    pub age_minutes: i64,
    pub last_seen_at: i64,
}

/// Per-capture ages with consecutive duplicates collapsed
pub fn age_series(observations: &[Observation]) -> Vec<AgePoint> {
    let mut points: Vec<AgePoint> = Vec::new();
    for o in observations {
        let age_minutes = (o.age_ms() as f64 / MS_PER_MINUTE).round() as i64;
        if points.last().map(|p| p.age_minutes) == Some(age_minutes) {
            continue;
        }
        points.push(AgePoint {
            t: o.captured_at,
            age_minutes,
            last_seen_at: o.last_seen_at,
        });
    }
    points
}

/// KPIs for a sorted observation log
pub fn kpis(observations: &[Observation]) -> Kpis {
    Kpis {
        observations_count: observations.len(),
        latest_last_seen_at: observations.last().map(|o| o.last_seen_at),
        latest_age_minutes: age_series(observations).last().map(|p| p.age_minutes),
    }
}

/// What a tooltip shows for one plotted point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointReadout {
    pub t: i64,
    pub minutes: i64,
    pub bucket: Bucket,
    pub last_seen_at: i64,
}

/// Read back a plotted signed value.
///
/// When the point carries no last-seen value it is reconstructed as
/// `t - minutes`. Non-finite values have no readout.
pub fn readout(t: i64, value: f64, last_seen_at: Option<i64>) -> Option<PointReadout> {
    if !value.is_finite() {
        return None;
    }
    let minutes = value.trunc().abs() as i64;
    Some(PointReadout {
        t,
        minutes,
        bucket: Bucket::from_minutes(minutes as f64),
        last_seen_at: last_seen_at.unwrap_or(t - minutes * 60_000),
    })
}
