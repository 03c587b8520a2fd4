//! Bucket banding
//!
//! Splits a stabilized, windowed series into four parallel series (Fresh,
//! Warm, Stale, Cold) carrying the signed staleness value. At every timestamp
//! at most one series holds a value; the other three hold a gap.
//!
//! With [`MaskStrategy::BoundaryClosing`], each bucket transition also emits a
//! synthetic point for the outgoing bucket at `t - CLOSE_EPSILON_MS`, with the
//! incoming age clamped into the outgoing bucket's range. The outgoing line is
//! drawn up to the seam instead of a diagonal joining two colours.

use crate::config::{TimelineConfig, CLOSE_EPSILON_MS};
use crate::types::{BandPoint, BandedSeries, Bucket, MaskStrategy, Sample};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bander {
    strategy: MaskStrategy,
}

impl Bander {
    pub fn new(strategy: MaskStrategy) -> Self {
        Self { strategy }
    }

    pub fn from_config(config: &TimelineConfig) -> Self {
        Self::new(config.mask_strategy)
    }

    pub fn strategy(&self) -> MaskStrategy {
        self.strategy
    }

    pub fn band(&self, samples: &[Sample]) -> BandedSeries {
        let mut bands = BandedSeries::default();
        let mut prev: Option<(Sample, Bucket)> = None;
        let mut closings = 0usize;

        for cur in samples {
            let Some(age) = cur.age_minutes else {
                push_row(&mut bands, cur.t, None, cur.last_seen_at);
                prev = None;
                continue;
            };
            let bucket = Bucket::from_minutes(age);

            if self.strategy == MaskStrategy::BoundaryClosing {
                if let Some((prev_sample, prev_bucket)) = prev {
                    let close_t = cur.t - CLOSE_EPSILON_MS;
                    if prev_bucket != bucket && close_t > prev_sample.t {
                        let value = prev_bucket.signed(prev_bucket.clamp_minutes(age));
                        push_row(
                            &mut bands,
                            close_t,
                            Some((prev_bucket, value)),
                            prev_sample.last_seen_at,
                        );
                        closings += 1;
                    }
                }
            }

            push_row(
                &mut bands,
                cur.t,
                Some((bucket, bucket.signed(age))),
                cur.last_seen_at,
            );
            prev = Some((*cur, bucket));
        }

        debug!(
            samples = samples.len(),
            closings,
            strategy = ?self.strategy,
            "banded series"
        );
        bands
    }
}

/// Append one timestamp to all four series; only `value`'s bucket gets a value
fn push_row(bands: &mut BandedSeries, t: i64, value: Option<(Bucket, f64)>, last_seen_at: i64) {
    for bucket in Bucket::ALL {
        let v = match value {
            Some((b, v)) if b == bucket => Some(v),
            _ => None,
        };
        bands.series_mut(bucket).push(BandPoint {
            t,
            value: v,
            last_seen_at,
        });
    }
}

/// Signed, unbanded series for the overview underlay; undefined samples are gaps
pub fn overview(samples: &[Sample]) -> Vec<BandPoint> {
    samples
        .iter()
        .map(|s| BandPoint {
            t: s.t,
            value: s.age_minutes.map(crate::types::signed_value),
            last_seen_at: s.last_seen_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STEP: i64 = 300_000;

    fn sample(i: i64, age: f64) -> Sample {
        Sample {
            t: i * STEP,
            age_minutes: Some(age),
            last_seen_at: i * STEP - (age * 60_000.0) as i64,
        }
    }

    fn values(series: &[BandPoint]) -> Vec<Option<f64>> {
        series.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_exclusive_masking() {
        let input = vec![sample(0, 10.0), sample(1, 20.0), sample(2, 45.0), sample(3, 90.0)];
        let bands = Bander::new(MaskStrategy::Exclusive).band(&input);

        assert_eq!(bands.len(), 4);
        assert_eq!(values(&bands.fresh), vec![Some(10.0), None, None, None]);
        assert_eq!(values(&bands.warm), vec![None, Some(20.0), None, None]);
        assert_eq!(values(&bands.stale), vec![None, None, Some(-45.0), None]);
        assert_eq!(values(&bands.cold), vec![None, None, None, Some(-90.0)]);
    }

    #[test]
    fn test_boundaries_are_closed_upper() {
        let input = vec![sample(0, 0.0), sample(1, 15.0), sample(2, 30.0), sample(3, 60.0)];
        let bands = Bander::new(MaskStrategy::Exclusive).band(&input);
        assert_eq!(values(&bands.fresh), vec![Some(0.0), Some(15.0), None, None]);
        assert_eq!(values(&bands.warm), vec![None, None, Some(30.0), None]);
        assert_eq!(values(&bands.stale), vec![None, None, None, Some(-60.0)]);
    }

    #[test]
    fn test_boundary_closing_upward_transition() {
        let input = vec![sample(0, 10.0), sample(1, 20.0)];
        let bands = Bander::new(MaskStrategy::BoundaryClosing).band(&input);

        assert_eq!(bands.len(), 3);
        let ts: Vec<i64> = bands.fresh.iter().map(|p| p.t).collect();
        assert_eq!(ts, vec![0, STEP - CLOSE_EPSILON_MS, STEP]);
        // Fresh closes at its upper boundary
        assert_eq!(values(&bands.fresh), vec![Some(10.0), Some(15.0), None]);
        assert_eq!(values(&bands.warm), vec![None, None, Some(20.0)]);
        assert_eq!(bands.fresh[1].last_seen_at, input[0].last_seen_at);
    }

    #[test]
    fn test_boundary_closing_reappearance_stays_inside_outgoing_bucket() {
        // Cold -> Fresh when the contact comes back online
        let input = vec![sample(0, 75.0), sample(1, 2.0)];
        let bands = Bander::new(MaskStrategy::BoundaryClosing).band(&input);

        let closing = bands.cold[1].value.unwrap();
        assert!(closing < -60.0, "closing value {closing} left the cold range");
        assert!(bands.fresh[1].value.is_none());
        assert_eq!(bands.fresh[2].value, Some(2.0));
    }

    #[test]
    fn test_no_closing_without_transition() {
        let input = vec![sample(0, 1.0), sample(1, 6.0), sample(2, 11.0)];
        let bands = Bander::new(MaskStrategy::BoundaryClosing).band(&input);
        assert_eq!(bands.len(), 3);
        assert_eq!(values(&bands.fresh), vec![Some(1.0), Some(6.0), Some(11.0)]);
    }

    #[test]
    fn test_exactly_one_value_per_timestamp() {
        let ages = [3.0, 18.0, 33.0, 70.0, 5.0, 29.0, 61.0, 14.0];
        let input: Vec<Sample> = ages
            .iter()
            .enumerate()
            .map(|(i, a)| sample(i as i64, *a))
            .collect();
        let bands = Bander::default().band(&input);

        for i in 0..bands.len() {
            let present = Bucket::ALL
                .iter()
                .filter(|b| bands.series(**b)[i].value.is_some())
                .count();
            assert_eq!(present, 1, "row {i}");
        }
    }

    #[test]
    fn test_overview_keeps_gaps() {
        let input = vec![
            Sample {
                t: 0,
                age_minutes: None,
                last_seen_at: 0,
            },
            sample(1, 40.0),
        ];
        assert_eq!(
            values(&overview(&input)),
            vec![None, Some(-40.0)]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(Bander::default().band(&[]).is_empty());
    }
}
