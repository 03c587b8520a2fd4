//! Pipeline orchestration
//!
//! This module provides the public API for Lastseen Timeline.
//! It runs the full pipeline from a raw change log to a rendered frame:
//! normalize → resample (full range) → stabilize → window → band, with the
//! scaler reading the raw in-window ages and the entrance detector and KPIs
//! reading the whole snapshot.
//!
//! [`TimelineSession`] owns the interactive state (window position, zoom,
//! current snapshot) and resolves overlapping recomputations with
//! last-snapshot-wins.

use std::sync::Arc;

use crate::bander::{overview, Bander};
use crate::config::TimelineConfig;
use crate::encoder::FrameEncoder;
use crate::entrance::EntranceDetector;
use crate::error::ComputeError;
use crate::normalizer::Normalizer;
use crate::resampler::Resampler;
use crate::scaler::signed_max_for;
use crate::schema::{parse_range, RawObservation, RawObservationAdapter};
use crate::stabilizer::Stabilizer;
use crate::summary::{kpis, readout, PointReadout};
use crate::types::{
    AxisSpec, Bucket, Observation, Sample, TimeRange, TimelineFrame, WindowBounds, WindowWidth,
};
use crate::window::Windower;
use tracing::{debug, warn};

const SIX_HOURS_MS: i64 = 6 * 3_600_000;
const DAY_MS: i64 = 24 * 3_600_000;

/// An immutable, normalized snapshot of the change log for one query range
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub generation: u64,
    pub range: TimeRange,
    pub observations: Arc<[Observation]>,
}

impl Snapshot {
    /// Build a snapshot, sorting observations by capture time
    pub fn new(generation: u64, range: TimeRange, observations: &[Observation]) -> Self {
        Self {
            generation,
            range,
            observations: Normalizer::normalize(observations).into(),
        }
    }

    pub fn from_records(generation: u64, range: TimeRange, records: &[RawObservation]) -> Self {
        let invalid = RawObservationAdapter::validate_records(records);
        if !invalid.is_empty() {
            warn!(
                count = invalid.len(),
                "records with last_seen_at after captured_at; their ages clamp to zero"
            );
        }
        Self {
            generation,
            range,
            observations: Normalizer::normalize_records(records).into(),
        }
    }
}

/// Axis tick hints for a window width: strftime pattern and tick count
pub fn tick_hints(width_ms: i64) -> (&'static str, u32) {
    let format = if width_ms <= DAY_MS {
        "%d %H:%M"
    } else {
        "%m-%d %H:%M"
    };
    let count = if width_ms <= SIX_HOURS_MS {
        9
    } else if width_ms <= DAY_MS {
        10
    } else {
        8
    };
    (format, count)
}

/// Configured pipeline stages
#[derive(Debug, Clone)]
pub struct TimelinePipeline {
    config: TimelineConfig,
    stabilizer: Stabilizer,
    bander: Bander,
    detector: EntranceDetector,
}

impl TimelinePipeline {
    pub fn new(config: TimelineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        let bander = Bander::from_config(&config);
        let detector = EntranceDetector::from_config(&config)?;
        debug!(
            strategy = ?bander.strategy(),
            timezone = detector.timezone().name(),
            step_ms = config.sample_step_ms,
            "timeline pipeline ready"
        );
        Ok(Self {
            stabilizer: Stabilizer::from_config(&config),
            bander,
            detector,
            config,
        })
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Compute the frame for a snapshot and window state.
    ///
    /// Pure: the same snapshot and window state always yield the same frame.
    pub fn compute(&self, snapshot: &Snapshot, windower: &Windower) -> TimelineFrame {
        let observations = &snapshot.observations[..];
        let width = windower.width();
        let bounds = windower.bounds();

        let samples = Resampler::resample(observations, snapshot.range, self.config.sample_step_ms);

        let raw_in_window = windower.filter(&samples);
        let signed_max = signed_max_for(&raw_in_window);

        let defined: Vec<Sample> = samples
            .iter()
            .filter(|s| s.age_minutes.is_some())
            .copied()
            .collect();
        let stabilized = self.stabilizer.stabilize(&defined);
        let visible = hold_into_window(&stabilized, &raw_in_window, bounds);
        let bands = self.bander.band(&visible);

        let (tick_format, tick_count) = tick_hints(width.ms());

        debug!(
            generation = snapshot.generation,
            samples = samples.len(),
            visible = visible.len(),
            signed_max,
            "computed timeline frame"
        );

        TimelineFrame {
            generation: snapshot.generation,
            axis: AxisSpec {
                visible_from: bounds.visible_from,
                visible_to: bounds.visible_to,
                signed_max,
                tick_format: tick_format.to_string(),
                tick_count,
            },
            overview: overview(&raw_in_window),
            bands,
            entrances: self.detector.summarize(observations),
            kpis: kpis(observations),
        }
    }
}

/// Kept samples inside `bounds`, led by the value the stabilizer holds at the
/// first defined in-window row when no kept sample falls there.
fn hold_into_window(kept: &[Sample], in_window: &[Sample], bounds: WindowBounds) -> Vec<Sample> {
    let Some(first) = in_window.iter().find(|s| s.age_minutes.is_some()) else {
        return Vec::new();
    };
    let start = kept.partition_point(|s| s.t < first.t);
    let mut visible: Vec<Sample> = kept[start..]
        .iter()
        .take_while(|s| bounds.contains(s.t))
        .copied()
        .collect();

    if visible.first().map(|s| s.t) != Some(first.t) {
        if let Some(held) = start.checked_sub(1).map(|i| kept[i]) {
            visible.insert(
                0,
                Sample {
                    t: first.t,
                    ..held
                },
            );
        }
    }
    visible
}

/// Tooltip readout for the banded row plotted at `t`
pub fn readout_at(frame: &TimelineFrame, t: i64) -> Option<PointReadout> {
    let row = frame.bands.fresh.iter().position(|p| p.t == t)?;
    Bucket::ALL.iter().find_map(|bucket| {
        let point = &frame.bands.series(*bucket)[row];
        point
            .value
            .and_then(|value| readout(point.t, value, Some(point.last_seen_at)))
    })
}

/// Render a JSON (array or NDJSON) change log into timeline payload JSON.
///
/// # Arguments
/// * `records` - Change log records as a JSON array or NDJSON
/// * `from_iso`, `to_iso` - RFC 3339 query range
/// * `width_hours` - One of 6, 24, 72, 168; the window ends at `to_iso`
/// * `config` - Pipeline configuration
///
/// # Example
/// ```ignore
/// let payload = lastseen_to_timeline(
///     records_json,
///     "2024-01-08T00:00:00Z",
///     "2024-01-15T00:00:00Z",
///     24,
///     &TimelineConfig::default(),
/// )?;
/// ```
pub fn lastseen_to_timeline(
    records: &str,
    from_iso: &str,
    to_iso: &str,
    width_hours: u32,
    config: &TimelineConfig,
) -> Result<String, ComputeError> {
    let range = parse_range(from_iso, to_iso)?;
    let width = WindowWidth::from_hours(width_hours)?;
    let pipeline = TimelinePipeline::new(config.clone())?;

    let raw = parse_records(records)?;
    let snapshot = Snapshot::from_records(0, range, &raw);
    let frame = pipeline.compute(&snapshot, &Windower::new(range, width));

    FrameEncoder::new().encode_to_json(&frame)
}

/// Parse a JSON array, falling back to NDJSON for anything else
pub fn parse_records(input: &str) -> Result<Vec<RawObservation>, ComputeError> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        RawObservationAdapter::parse_array(trimmed)
    } else {
        RawObservationAdapter::parse_ndjson(trimmed)
    }
}

/// Interactive timeline state with last-snapshot-wins semantics.
///
/// Every fetch takes a ticket from [`TimelineSession::begin_fetch`]. Only the
/// snapshot carrying the newest ticket is installed; frames computed from any
/// other generation are discarded by [`TimelineSession::accept`].
#[derive(Debug, Clone)]
pub struct TimelineSession {
    pipeline: TimelinePipeline,
    width: WindowWidth,
    latest_ticket: u64,
    snapshot: Option<Snapshot>,
    windower: Option<Windower>,
}

impl TimelineSession {
    pub fn new(config: TimelineConfig) -> Result<Self, ComputeError> {
        let width = config.default_width;
        Ok(Self {
            pipeline: TimelinePipeline::new(config)?,
            width,
            latest_ticket: 0,
            snapshot: None,
            windower: None,
        })
    }

    pub fn pipeline(&self) -> &TimelinePipeline {
        &self.pipeline
    }

    /// Start a fetch; the returned generation supersedes all earlier ones
    pub fn begin_fetch(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.latest_ticket
    }

    /// Whether `generation` is the newest fetch issued
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest_ticket
    }

    /// Install a fetched snapshot. Returns `false` if it was superseded.
    pub fn install_snapshot(&mut self, snapshot: Snapshot) -> bool {
        if !self.is_current(snapshot.generation) {
            debug!(
                generation = snapshot.generation,
                latest = self.latest_ticket,
                "discarding superseded snapshot"
            );
            return false;
        }

        let keep_window = self
            .windower
            .map(|w| w.range() == snapshot.range)
            .unwrap_or(false);
        if !keep_window {
            self.windower = Some(Windower::new(snapshot.range, self.width));
        }
        self.snapshot = Some(snapshot);
        true
    }

    /// Install boundary records fetched under `generation`
    pub fn install_records(
        &mut self,
        generation: u64,
        range: TimeRange,
        records: &[RawObservation],
    ) -> bool {
        self.install_snapshot(Snapshot::from_records(generation, range, records))
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn windower(&self) -> Option<&Windower> {
        self.windower.as_ref()
    }

    pub fn width(&self) -> WindowWidth {
        self.width
    }

    pub fn set_width(&mut self, width: WindowWidth) {
        self.width = width;
        if let Some(windower) = self.windower.as_mut() {
            windower.set_width(width);
        }
    }

    pub fn set_width_hours(&mut self, hours: u32) -> Result<(), ComputeError> {
        self.set_width(WindowWidth::from_hours(hours)?);
        Ok(())
    }

    pub fn pan(&mut self, delta_ms: i64) {
        if let Some(windower) = self.windower.as_mut() {
            windower.pan(delta_ms);
        }
    }

    pub fn step_back(&mut self) {
        if let Some(windower) = self.windower.as_mut() {
            windower.step_back();
        }
    }

    pub fn step_forward(&mut self) {
        if let Some(windower) = self.windower.as_mut() {
            windower.step_forward();
        }
    }

    pub fn wheel(&mut self, delta_y: f64) {
        if let Some(windower) = self.windower.as_mut() {
            windower.wheel(delta_y);
        }
    }

    /// Frame for the current snapshot and window, if a snapshot is installed
    pub fn render(&self) -> Option<TimelineFrame> {
        match (&self.snapshot, &self.windower) {
            (Some(snapshot), Some(windower)) => Some(self.pipeline.compute(snapshot, windower)),
            _ => None,
        }
    }

    /// Readout for the row at `t` in the current frame
    pub fn readout_at(&self, t: i64) -> Option<PointReadout> {
        self.render().and_then(|frame| readout_at(&frame, t))
    }

    /// Keep a frame computed elsewhere only if it belongs to the current snapshot
    pub fn accept(&self, frame: TimelineFrame) -> Option<TimelineFrame> {
        let current = self.snapshot.as_ref().map(|s| s.generation);
        if current == Some(frame.generation) && self.is_current(frame.generation) {
            Some(frame)
        } else {
            debug!(generation = frame.generation, "discarding stale frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MIN: i64 = 60_000;
    const HOUR: i64 = 60 * MIN;

    fn range_hours(hours: i64) -> TimeRange {
        TimeRange::new(0, hours * HOUR).unwrap()
    }

    /// Contact online every 10 minutes for the first two hours, then gone
    fn sample_log() -> Vec<Observation> {
        let mut log: Vec<Observation> = (0..12)
            .map(|i| Observation::new(i * 10 * MIN + 2 * MIN, i * 10 * MIN))
            .collect();
        log.push(Observation::new(5 * HOUR, 110 * MIN));
        log
    }

    fn sample_records_json() -> &'static str {
        r#"[
            {"captured_at": "2024-01-15T08:20:00Z", "last_seen_at": "2024-01-15T08:19:00Z"},
            {"captured_at": "2024-01-15T08:00:00Z", "last_seen_at": "2024-01-15T07:10:00Z"},
            {"captured_at": "2024-01-15T09:30:00Z", "last_seen_at": "2024-01-15T08:19:00Z"}
        ]"#
    }

    #[test]
    fn test_compute_frame_shape() {
        let pipeline = TimelinePipeline::new(TimelineConfig::with_timezone("UTC")).unwrap();
        let range = range_hours(6);
        let snapshot = Snapshot::new(1, range, &sample_log());
        let frame = pipeline.compute(&snapshot, &Windower::new(range, WindowWidth::SixHours));

        assert_eq!(frame.generation, 1);
        assert_eq!(frame.axis.visible_from, 0);
        assert_eq!(frame.axis.visible_to, 6 * HOUR);
        assert_eq!(frame.axis.tick_format, "%d %H:%M");
        assert_eq!(frame.axis.tick_count, 9);
        assert_eq!(frame.overview.len(), 73);
        assert_eq!(frame.kpis.observations_count, 13);
        assert_eq!(frame.kpis.latest_last_seen_at, Some(110 * MIN));
        assert_eq!(frame.entrances.entries_by_hour.len(), 24);

        // Fresh early on, cold by the end
        assert!(frame.bands.fresh.iter().any(|p| p.value.is_some()));
        let last_cold = frame.bands.cold.last().and_then(|p| p.value).unwrap();
        assert!(last_cold < -60.0);
        assert!(frame.axis.signed_max >= 15 && frame.axis.signed_max <= 180);
        assert_eq!(frame.axis.signed_max % 5, 0);
    }

    #[test]
    fn test_samples_before_first_capture_are_gaps() {
        let pipeline = TimelinePipeline::new(TimelineConfig::with_timezone("UTC")).unwrap();
        let range = range_hours(6);
        let log = vec![Observation::new(HOUR, HOUR - MIN)];
        let snapshot = Snapshot::new(1, range, &log);
        let frame = pipeline.compute(&snapshot, &Windower::new(range, WindowWidth::SixHours));

        assert!(frame.overview[..12].iter().all(|p| p.value.is_none()));
        assert!(frame.overview[12].value.is_some());
        assert!(frame.bands.fresh.iter().all(|p| p.t >= HOUR));
    }

    #[test]
    fn test_empty_snapshot() {
        let pipeline = TimelinePipeline::new(TimelineConfig::default()).unwrap();
        let range = range_hours(24);
        let frame = pipeline.compute(
            &Snapshot::new(1, range, &[]),
            &Windower::new(range, WindowWidth::Day),
        );
        assert!(frame.overview.is_empty());
        assert!(frame.bands.is_empty());
        assert_eq!(frame.axis.signed_max, 15);
        assert_eq!(frame.kpis.observations_count, 0);
        assert_eq!(frame.entrances.last_entrance_at, None);
    }

    #[test]
    fn test_stabilized_points_do_not_move_under_pan() {
        let pipeline = TimelinePipeline::new(TimelineConfig::with_timezone("UTC")).unwrap();
        let range = range_hours(24);
        let log: Vec<Observation> = (0..48)
            .map(|i| Observation::new(i * 30 * MIN + 7 * MIN, i * 30 * MIN))
            .collect();
        let snapshot = Snapshot::new(1, range, &log);

        let mut windower = Windower::new(range, WindowWidth::SixHours);
        let late = pipeline.compute(&snapshot, &windower);
        windower.step_back();
        let earlier = pipeline.compute(&snapshot, &windower);

        // Sample rows only; closing rows sit 1 ms off the grid
        let kept = |frame: &TimelineFrame| -> Vec<i64> {
            (0..frame.bands.len())
                .filter(|i| Bucket::ALL.iter().any(|b| frame.bands.series(*b)[*i].value.is_some()))
                .map(|i| frame.bands.fresh[i].t)
                .filter(|t| t % (5 * MIN) == 0)
                .collect()
        };
        // The later window's first row is the held value re-emitted at its edge
        let overlap_from = late.axis.visible_from;
        let overlap_to = earlier.axis.visible_to;
        let in_overlap = |ts: Vec<i64>| -> Vec<i64> {
            ts.into_iter()
                .filter(|t| *t > overlap_from && *t <= overlap_to)
                .collect()
        };
        assert_eq!(in_overlap(kept(&late)), in_overlap(kept(&earlier)));
    }

    fn banded_rows(frame: &TimelineFrame) -> usize {
        (0..frame.bands.len())
            .filter(|i| Bucket::ALL.iter().any(|b| frame.bands.series(*b)[*i].value.is_some()))
            .count()
    }

    #[test]
    fn test_steady_age_keeps_every_window_banded() {
        let pipeline = TimelinePipeline::new(TimelineConfig::with_timezone("UTC")).unwrap();
        let range = range_hours(48);
        // Online the whole time: the age never changes
        let log: Vec<Observation> = (0..=48 * 60)
            .map(|i| Observation::new(i * MIN, i * MIN))
            .collect();
        let snapshot = Snapshot::new(1, range, &log);

        let mut windower = Windower::new(range, WindowWidth::SixHours);
        for _ in 0..50 {
            let frame = pipeline.compute(&snapshot, &windower);
            let defined = frame.overview.iter().filter(|p| p.value.is_some()).count();
            assert!(defined > 0);
            assert!(banded_rows(&frame) >= 1, "empty bands at {}", frame.axis.visible_from);
            assert_eq!(frame.bands.fresh[0].t, frame.axis.visible_from);
            assert_eq!(frame.bands.fresh[0].value, Some(0.0));
            windower.step_back();
        }
    }

    #[test]
    fn test_window_starts_with_held_value() {
        let pipeline = TimelinePipeline::new(TimelineConfig::with_timezone("UTC")).unwrap();
        let range = range_hours(24);
        // Always 90 minutes behind: only the very first sample survives stabilizing
        let log: Vec<Observation> = (0..=24 * 60)
            .map(|i| Observation::new(i * MIN, i * MIN - 90 * MIN))
            .collect();
        let snapshot = Snapshot::new(1, range, &log);
        let mut windower = Windower::new(range, WindowWidth::SixHours);
        windower.pan(-12 * HOUR);

        let frame = pipeline.compute(&snapshot, &windower);
        assert_eq!(frame.axis.visible_from, 6 * HOUR);
        assert_eq!(frame.bands.cold[0].t, 6 * HOUR);
        assert_eq!(frame.bands.cold[0].value, Some(-90.0));
        assert_eq!(banded_rows(&frame), 1);
    }

    #[test]
    fn test_window_before_first_capture_has_no_bands() {
        let pipeline = TimelinePipeline::new(TimelineConfig::with_timezone("UTC")).unwrap();
        let range = range_hours(24);
        let snapshot = Snapshot::new(1, range, &[Observation::new(20 * HOUR, 20 * HOUR)]);
        let mut windower = Windower::new(range, WindowWidth::SixHours);
        windower.pan(-18 * HOUR);

        let frame = pipeline.compute(&snapshot, &windower);
        assert!(frame.overview.iter().all(|p| p.value.is_none()));
        assert!(frame.bands.is_empty());
    }

    #[test]
    fn test_tick_hints() {
        assert_eq!(tick_hints(6 * HOUR), ("%d %H:%M", 9));
        assert_eq!(tick_hints(24 * HOUR), ("%d %H:%M", 10));
        assert_eq!(tick_hints(72 * HOUR), ("%m-%d %H:%M", 8));
        assert_eq!(tick_hints(168 * HOUR), ("%m-%d %H:%M", 8));
    }

    #[test]
    fn test_lastseen_to_timeline() {
        let result = lastseen_to_timeline(
            sample_records_json(),
            "2024-01-15T06:00:00Z",
            "2024-01-15T12:00:00Z",
            6,
            &TimelineConfig::with_timezone("UTC"),
        );

        assert!(result.is_ok());
        let payload: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(payload["producer"]["name"], "lastseen-timeline");
        assert_eq!(payload["observationsCount"], 3);
        assert_eq!(payload["tickCount"], 9);

        // 07:10 -> 08:19 is a fresh forward jump
        let hours = payload["entriesByHour"].as_array().unwrap();
        assert_eq!(hours[8]["count"], 1);
        assert_eq!(payload["lastEntranceAt"], 1_705_306_740_000i64);
    }

    #[test]
    fn test_lastseen_to_timeline_is_idempotent() {
        let config = TimelineConfig::default();
        let run = || {
            lastseen_to_timeline(
                sample_records_json(),
                "2024-01-15T06:00:00Z",
                "2024-01-15T12:00:00Z",
                24,
                &config,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_lastseen_to_timeline_rejects_bad_input() {
        let config = TimelineConfig::default();
        assert!(matches!(
            lastseen_to_timeline("[]", "2024-01-15T12:00:00Z", "2024-01-15T06:00:00Z", 6, &config),
            Err(ComputeError::InvalidRange { .. })
        ));
        assert!(matches!(
            lastseen_to_timeline("[]", "2024-01-15T06:00:00Z", "2024-01-15T12:00:00Z", 12, &config),
            Err(ComputeError::UnsupportedWindowWidth(12))
        ));
        assert!(matches!(
            lastseen_to_timeline("{oops", "2024-01-15T06:00:00Z", "2024-01-15T12:00:00Z", 6, &config),
            Err(ComputeError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_records_accepts_both_shapes() {
        let ndjson = "{\"captured_at\":\"2024-01-15T08:20:00Z\",\"last_seen_at\":\"2024-01-15T08:19:00Z\"}\n";
        assert_eq!(parse_records(ndjson).unwrap().len(), 1);
        assert_eq!(parse_records(sample_records_json()).unwrap().len(), 3);
        assert!(parse_records("  ").unwrap().is_empty());
    }

    #[test]
    fn test_session_last_snapshot_wins() {
        let mut session = TimelineSession::new(TimelineConfig::with_timezone("UTC")).unwrap();
        let range = range_hours(12);

        let slow = session.begin_fetch();
        let fast = session.begin_fetch();

        assert!(session.install_snapshot(Snapshot::new(fast, range, &sample_log())));
        // The older fetch finishes last and must not replace the newer one
        assert!(!session.install_snapshot(Snapshot::new(slow, range, &[])));
        assert_eq!(session.snapshot().map(|s| s.generation), Some(fast));

        let frame = session.render().unwrap();
        assert_eq!(frame.generation, fast);
        assert!(session.accept(frame.clone()).is_some());

        // A frame computed before a newer fetch completes is dropped
        let next = session.begin_fetch();
        assert!(session.accept(frame).is_none());
        assert!(session.install_snapshot(Snapshot::new(next, range, &sample_log())));
        assert_eq!(session.render().map(|f| f.generation), Some(next));
    }

    #[test]
    fn test_session_window_controls() {
        let mut session = TimelineSession::new(TimelineConfig::with_timezone("UTC")).unwrap();
        assert!(session.render().is_none());
        session.step_back();

        let range = range_hours(48);
        let generation = session.begin_fetch();
        session.install_snapshot(Snapshot::new(generation, range, &sample_log()));
        assert_eq!(session.render().unwrap().axis.visible_to, 48 * HOUR);

        session.step_back();
        session.wheel(-1.0);
        assert_eq!(
            session.render().unwrap().axis.visible_to,
            48 * HOUR - HOUR - 30 * MIN
        );

        // Refreshing the same range keeps the window position
        let generation = session.begin_fetch();
        session.install_snapshot(Snapshot::new(generation, range, &sample_log()));
        assert_eq!(
            session.render().unwrap().axis.visible_to,
            48 * HOUR - HOUR - 30 * MIN
        );

        session.set_width_hours(24).unwrap();
        let frame = session.render().unwrap();
        assert_eq!(frame.axis.visible_to, 48 * HOUR);
        assert_eq!(frame.axis.visible_from, 24 * HOUR);
        assert_eq!(frame.axis.tick_count, 10);
        assert!(session.set_width_hours(5).is_err());
    }

    #[test]
    fn test_readout_at_banded_row() {
        let mut session = TimelineSession::new(TimelineConfig::with_timezone("UTC")).unwrap();
        assert!(session.readout_at(5 * MIN).is_none());

        let range = range_hours(6);
        let generation = session.begin_fetch();
        session.install_snapshot(Snapshot::new(generation, range, &sample_log()));

        let point = session.readout_at(5 * MIN).unwrap();
        assert_eq!(point.minutes, 5);
        assert_eq!(point.bucket, Bucket::Fresh);
        assert_eq!(point.last_seen_at, 0);
        assert!(session.readout_at(5 * MIN + 1).is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TimelineConfig::with_timezone("Mars/Olympus");
        assert!(matches!(
            TimelinePipeline::new(config),
            Err(ComputeError::InvalidTimezone(_))
        ));
    }
}
