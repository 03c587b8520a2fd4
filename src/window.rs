//! Pannable, zoomable window over the query range
//!
//! The window state (`width`, `window_end`) belongs to the interactive shell.
//! Pans are recorded unclamped; clamping happens only when bounds are read, so
//! an out-of-range pan never corrupts later zoom changes.

use crate::config::{PAN_STEP_MS, WHEEL_STEP_MS};
use crate::error::ComputeError;
use crate::types::{Sample, TimeRange, WindowBounds, WindowWidth};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Windower {
    range: TimeRange,
    width: WindowWidth,
    window_end: i64,
}

impl Windower {
    /// A window of `width` ending at the range end
    pub fn new(range: TimeRange, width: WindowWidth) -> Self {
        Self {
            range,
            width,
            window_end: range.to,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn width(&self) -> WindowWidth {
        self.width
    }

    /// Raw, unclamped window end
    pub fn window_end(&self) -> i64 {
        self.window_end
    }

    pub fn pan(&mut self, delta_ms: i64) {
        self.window_end = self.window_end.saturating_add(delta_ms);
    }

    /// Pan one step back in time
    pub fn step_back(&mut self) {
        self.pan(-PAN_STEP_MS);
    }

    /// Pan one step forward in time
    pub fn step_forward(&mut self) {
        self.pan(PAN_STEP_MS);
    }

    /// Wheel scrolling: positive delta moves forward, negative back
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y > 0.0 {
            self.pan(WHEEL_STEP_MS);
        } else if delta_y < 0.0 {
            self.pan(-WHEEL_STEP_MS);
        }
    }

    /// Change zoom level; the window snaps back to the range end
    pub fn set_width(&mut self, width: WindowWidth) {
        self.width = width;
        self.window_end = self.range.to;
    }

    pub fn set_width_hours(&mut self, hours: u32) -> Result<(), ComputeError> {
        self.set_width(WindowWidth::from_hours(hours)?);
        Ok(())
    }

    /// Visible bounds, clamped into the range
    pub fn bounds(&self) -> WindowBounds {
        clamp_window(self.range, self.width.ms(), self.window_end)
    }

    /// Samples with `visible_from <= t <= visible_to`
    pub fn filter(&self, samples: &[Sample]) -> Vec<Sample> {
        let bounds = self.bounds();
        samples
            .iter()
            .filter(|s| bounds.contains(s.t))
            .copied()
            .collect()
    }
}

/// Clamp a requested window end into `range` for a window of `width_ms`.
///
/// The result is exactly `width_ms` wide unless the range itself is narrower,
/// in which case it is the whole range.
pub fn clamp_window(range: TimeRange, width_ms: i64, window_end: i64) -> WindowBounds {
    if range.len_ms() <= width_ms {
        return WindowBounds {
            visible_from: range.from,
            visible_to: range.to,
        };
    }
    let clamped_end = window_end.clamp(range.from + width_ms, range.to);
    WindowBounds {
        visible_from: range.from.max(clamped_end - width_ms),
        visible_to: clamped_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HOUR: i64 = 3_600_000;

    fn week() -> TimeRange {
        TimeRange::new(0, 7 * 24 * HOUR).unwrap()
    }

    #[test]
    fn test_defaults_to_range_end() {
        let windower = Windower::new(week(), WindowWidth::SixHours);
        assert_eq!(
            windower.bounds(),
            WindowBounds {
                visible_from: 162 * HOUR,
                visible_to: 168 * HOUR,
            }
        );
    }

    #[test]
    fn test_pan_and_step_controls() {
        let mut windower = Windower::new(week(), WindowWidth::SixHours);
        windower.step_back();
        windower.step_back();
        windower.wheel(-3.0);
        assert_eq!(windower.bounds().visible_to, 168 * HOUR - 2 * HOUR - HOUR / 2);
        windower.wheel(0.0);
        windower.step_forward();
        assert_eq!(windower.bounds().visible_to, 168 * HOUR - HOUR - HOUR / 2);
    }

    #[test]
    fn test_clamps_without_correcting_state() {
        let mut windower = Windower::new(week(), WindowWidth::Day);
        windower.pan(-1000 * HOUR);
        assert_eq!(
            windower.bounds(),
            WindowBounds {
                visible_from: 0,
                visible_to: 24 * HOUR,
            }
        );
        // State keeps the raw request
        assert_eq!(windower.window_end(), 168 * HOUR - 1000 * HOUR);

        windower.pan(5000 * HOUR);
        assert_eq!(windower.bounds().visible_to, 168 * HOUR);
    }

    #[test]
    fn test_set_width_resets_end() {
        let mut windower = Windower::new(week(), WindowWidth::SixHours);
        windower.pan(-50 * HOUR);
        windower.set_width_hours(72).unwrap();
        assert_eq!(windower.width(), WindowWidth::ThreeDays);
        assert_eq!(windower.bounds().visible_to, 168 * HOUR);
        assert_eq!(windower.bounds().width_ms(), 72 * HOUR);

        assert!(matches!(
            windower.set_width_hours(12),
            Err(ComputeError::UnsupportedWindowWidth(12))
        ));
        assert_eq!(windower.width(), WindowWidth::ThreeDays);
    }

    #[test]
    fn test_narrow_range_uses_whole_range() {
        let range = TimeRange::new(10 * HOUR, 13 * HOUR).unwrap();
        let mut windower = Windower::new(range, WindowWidth::Week);
        windower.pan(400 * HOUR);
        assert_eq!(
            windower.bounds(),
            WindowBounds {
                visible_from: 10 * HOUR,
                visible_to: 13 * HOUR,
            }
        );
    }

    #[test]
    fn test_filter_is_inclusive() {
        let range = TimeRange::new(0, 12 * HOUR).unwrap();
        let windower = Windower::new(range, WindowWidth::SixHours);
        let samples: Vec<Sample> = (0..=12)
            .map(|h| Sample {
                t: h * HOUR,
                age_minutes: Some(1.0),
                last_seen_at: h * HOUR,
            })
            .collect();
        let visible = windower.filter(&samples);
        assert_eq!(visible.first().map(|s| s.t), Some(6 * HOUR));
        assert_eq!(visible.last().map(|s| s.t), Some(12 * HOUR));
        assert_eq!(visible.len(), 7);
    }

    #[test]
    fn test_unchecked_extreme_range_does_not_overflow() {
        let range = TimeRange {
            from: i64::MIN,
            to: i64::MAX,
        };
        let mut windower = Windower::new(range, WindowWidth::Day);
        assert_eq!(windower.bounds().visible_to, i64::MAX);
        assert_eq!(windower.bounds().width_ms(), 24 * HOUR);

        windower.pan(i64::MIN);
        windower.pan(i64::MIN);
        assert_eq!(windower.bounds().visible_from, i64::MIN);
    }
}
