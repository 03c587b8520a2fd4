//! Core types for the Lastseen Timeline pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: normalized observations, resampled samples, staleness buckets,
//! banded series, entrance summaries and the final timeline frame.
//!
//! All instants are integer milliseconds since the Unix epoch.

use crate::config::{
    CLOSE_EPSILON_MINUTES, FRESH_MAX_MINUTES, MAX_RANGE_MS, STALE_MAX_MINUTES, WARM_MAX_MINUTES,
};
use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

const MS_PER_HOUR: i64 = 3_600_000;

/// One normalized `(capturedAt, lastSeenAt)` record from the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// When the observation was captured (ms)
    pub captured_at: i64,
    /// The last-seen value reported at capture time (ms)
    pub last_seen_at: i64,
}

impl Observation {
    pub fn new(captured_at: i64, last_seen_at: i64) -> Self {
        Self {
            captured_at,
            last_seen_at,
        }
    }

    /// Age of the last-seen value at capture time, never negative (ms)
    pub fn age_ms(&self) -> i64 {
        self.captured_at.saturating_sub(self.last_seen_at).max(0)
    }
}

/// One resampled point at a fixed step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample instant (ms)
    pub t: i64,
    /// Whole minutes since `last_seen_at`; `None` before the first observation
    pub age_minutes: Option<f64>,
    /// Last-seen value carried forward to `t` (ms)
    pub last_seen_at: i64,
}

/// Staleness category of an age in minutes.
///
/// Boundaries are closed-upper, open-lower at 15/30/60; `Fresh` is closed at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Fresh,
    Warm,
    Stale,
    Cold,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Fresh, Bucket::Warm, Bucket::Stale, Bucket::Cold];

    pub fn from_minutes(minutes: f64) -> Self {
        if minutes <= FRESH_MAX_MINUTES {
            Bucket::Fresh
        } else if minutes <= WARM_MAX_MINUTES {
            Bucket::Warm
        } else if minutes <= STALE_MAX_MINUTES {
            Bucket::Stale
        } else {
            Bucket::Cold
        }
    }

    /// Fresh and Warm plot upwards, Stale and Cold downwards
    pub fn is_upward(&self) -> bool {
        matches!(self, Bucket::Fresh | Bucket::Warm)
    }

    /// Apply this bucket's sign to a magnitude in minutes
    pub fn signed(&self, minutes: f64) -> f64 {
        if self.is_upward() {
            minutes
        } else {
            -minutes
        }
    }

    /// Inclusive lower and upper limits of the values this bucket may carry.
    ///
    /// Open lower boundaries are nudged up by [`CLOSE_EPSILON_MINUTES`].
    pub fn limits(&self) -> (f64, f64) {
        match self {
            Bucket::Fresh => (0.0, FRESH_MAX_MINUTES),
            Bucket::Warm => (FRESH_MAX_MINUTES + CLOSE_EPSILON_MINUTES, WARM_MAX_MINUTES),
            Bucket::Stale => (WARM_MAX_MINUTES + CLOSE_EPSILON_MINUTES, STALE_MAX_MINUTES),
            Bucket::Cold => (STALE_MAX_MINUTES + CLOSE_EPSILON_MINUTES, f64::INFINITY),
        }
    }

    /// Clamp a magnitude so it stays strictly inside this bucket
    pub fn clamp_minutes(&self, minutes: f64) -> f64 {
        let (lo, hi) = self.limits();
        minutes.max(lo).min(hi)
    }
}

/// Signed staleness: `+minutes` for Fresh/Warm, `-minutes` for Stale/Cold
pub fn signed_value(minutes: f64) -> f64 {
    Bucket::from_minutes(minutes).signed(minutes)
}

/// Absolute query range of one snapshot, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub fn new(from: i64, to: i64) -> Result<Self, ComputeError> {
        if from > to {
            return Err(ComputeError::InvalidRange { from, to });
        }
        match to.checked_sub(from) {
            Some(span) if span <= MAX_RANGE_MS => Ok(Self { from, to }),
            _ => Err(ComputeError::RangeTooLong {
                from,
                to,
                max_days: MAX_RANGE_MS / (24 * MS_PER_HOUR),
            }),
        }
    }

    /// Span in ms, saturating for ranges built without [`TimeRange::new`]
    pub fn len_ms(&self) -> i64 {
        self.to.saturating_sub(self.from)
    }

    pub fn contains(&self, t: i64) -> bool {
        self.from <= t && t <= self.to
    }
}

/// Visible sub-range derived from window state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub visible_from: i64,
    pub visible_to: i64,
}

impl WindowBounds {
    pub fn contains(&self, t: i64) -> bool {
        self.visible_from <= t && t <= self.visible_to
    }

    pub fn width_ms(&self) -> i64 {
        self.visible_to.saturating_sub(self.visible_from)
    }
}

/// Zoom levels offered by the window menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum WindowWidth {
    #[default]
    SixHours,
    Day,
    ThreeDays,
    Week,
}

impl WindowWidth {
    pub const ALL: [WindowWidth; 4] = [
        WindowWidth::SixHours,
        WindowWidth::Day,
        WindowWidth::ThreeDays,
        WindowWidth::Week,
    ];

    pub fn hours(&self) -> u32 {
        match self {
            WindowWidth::SixHours => 6,
            WindowWidth::Day => 24,
            WindowWidth::ThreeDays => 72,
            WindowWidth::Week => 168,
        }
    }

    pub fn ms(&self) -> i64 {
        i64::from(self.hours()) * MS_PER_HOUR
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindowWidth::SixHours => "6h",
            WindowWidth::Day => "24h",
            WindowWidth::ThreeDays => "3d",
            WindowWidth::Week => "7d",
        }
    }

    pub fn from_hours(hours: u32) -> Result<Self, ComputeError> {
        WindowWidth::ALL
            .into_iter()
            .find(|w| w.hours() == hours)
            .ok_or(ComputeError::UnsupportedWindowWidth(hours))
    }
}

impl TryFrom<u32> for WindowWidth {
    type Error = ComputeError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        WindowWidth::from_hours(hours)
    }
}

impl From<WindowWidth> for u32 {
    fn from(width: WindowWidth) -> Self {
        width.hours()
    }
}

/// How the bander keeps the four series visually separate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStrategy {
    /// Every sample appears in all four series, gaps in the non-matching three
    Exclusive,
    /// Like `Exclusive`, plus a synthetic closing point for the outgoing bucket
    /// just before each transition
    #[default]
    BoundaryClosing,
}

/// One plotted point; `value` is `None` where the series has a gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub t: i64,
    pub value: Option<f64>,
    pub last_seen_at: i64,
}

/// Four parallel series, one per bucket, all of equal length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandedSeries {
    pub fresh: Vec<BandPoint>,
    pub warm: Vec<BandPoint>,
    pub stale: Vec<BandPoint>,
    pub cold: Vec<BandPoint>,
}

impl BandedSeries {
    pub fn series(&self, bucket: Bucket) -> &[BandPoint] {
        match bucket {
            Bucket::Fresh => &self.fresh,
            Bucket::Warm => &self.warm,
            Bucket::Stale => &self.stale,
            Bucket::Cold => &self.cold,
        }
    }

    pub(crate) fn series_mut(&mut self, bucket: Bucket) -> &mut Vec<BandPoint> {
        match bucket {
            Bucket::Fresh => &mut self.fresh,
            Bucket::Warm => &mut self.warm,
            Bucket::Stale => &mut self.stale,
            Bucket::Cold => &mut self.cold,
        }
    }

    pub fn len(&self) -> usize {
        self.fresh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fresh.is_empty()
    }
}

/// An inferred arrival: the last-seen value jumped forward while still fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntranceEvent {
    /// The new last-seen value (ms)
    pub at_last_seen: i64,
    /// Hour of `at_last_seen` in the configured civil timezone
    pub hour_of_day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: u32,
}

/// Hourly arrival histogram plus the most recent fresh sighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntranceSummary {
    /// Always 24 entries, hours 0..=23
    pub entries_by_hour: Vec<HourCount>,
    pub last_entrance_at: Option<i64>,
}

/// Headline numbers shown above the timeline
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Kpis {
    pub observations_count: usize,
    pub latest_last_seen_at: Option<i64>,
    pub latest_age_minutes: Option<i64>,
}

/// Axis configuration for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub visible_from: i64,
    pub visible_to: i64,
    /// Symmetric vertical bound in minutes, a multiple of 5 in `[15, 180]`
    pub signed_max: u32,
    /// strftime pattern for x-axis ticks
    pub tick_format: String,
    pub tick_count: u32,
}

/// Everything the renderer needs for one snapshot and window state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineFrame {
    /// Generation of the snapshot this frame was computed from
    pub generation: u64,
    pub axis: AxisSpec,
    /// Unstabilized in-window series; undefined samples are gaps
    pub overview: Vec<BandPoint>,
    pub bands: BandedSeries,
    pub entrances: EntranceSummary,
    pub kpis: Kpis,
}

/// Producer metadata embedded in every payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadProducer {
    pub name: String,
    pub version: String,
}

/// One point as the rendering layer consumes it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePoint {
    pub t: i64,
    pub value: Option<f64>,
    pub last_seen_at: i64,
}

impl From<&BandPoint> for WirePoint {
    fn from(p: &BandPoint) -> Self {
        Self {
            t: p.t,
            value: p.value,
            last_seen_at: p.last_seen_at,
        }
    }
}

/// Complete timeline payload handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePayload {
    pub schema_version: String,
    pub producer: PayloadProducer,
    pub generation: u64,
    pub visible_from: i64,
    pub visible_to: i64,
    pub signed_max: u32,
    pub tick_format: String,
    pub tick_count: u32,
    pub overview: Vec<WirePoint>,
    pub fresh: Vec<WirePoint>,
    pub warm: Vec<WirePoint>,
    pub stale: Vec<WirePoint>,
    pub cold: Vec<WirePoint>,
    pub entries_by_hour: Vec<HourCount>,
    pub last_entrance_at: Option<i64>,
    pub observations_count: usize,
    pub latest_last_seen_at: Option<i64>,
    pub latest_age_minutes: Option<i64>,
}
