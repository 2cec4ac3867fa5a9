//! Normalization and weighted scoring of averaged metrics.
//!
//! Scoring happens in two pure steps:
//!
//! 1. **Normalize** every quantity by a fixed scale ([`Scales`]), projecting
//!    averages onto a roughly `[0, 1]` range.
//! 2. **Combine** four normalized quantities with [`score_term`]: request
//!    duration is a reward, blocked time, failed requests and failed checks are
//!    penalties. The final score is `max(reward - penalties, 0)`.
//!
//! ```text
//! score_term(v, w) = 0                              if v == 0
//!                  = w * (w - min(v, 1)) * 100      otherwise
//! ```
//!
//! The term is not monotonic in the intuitive direction: a normalized value
//! past the weight drives the term negative, so a large penalty quantity can
//! *raise* the score. The shape is part of the scoring contract.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::aggregate::AveragedMetrics;

/// Value used for quantities that have no backing sample series.
///
/// `http_req_failed`, `http_req_connecting` and `http_reqs` are normalized
/// and `http_req_failed` is weighted, but nothing collects them, so they are
/// always zero.
pub const UNTRACKED: f64 = 0.0;

/// Reward and penalty weights.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    /// Positive class.
    pub duration: f64,
    /// Negative class.
    pub blocked: f64,
    pub failed: f64,
    pub check_failed: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            duration: 1.0,
            blocked: 0.2,
            failed: 0.4,
            check_failed: 0.4,
        }
    }
}

/// Divisors applied during normalization.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Scales {
    pub http_req_duration: f64,
    pub http_req_blocked: f64,
    pub http_req_failed: f64,
    pub http_req_connecting: f64,
    pub http_reqs: f64,
    pub http_req_check_failed: f64,
}

impl Default for Scales {
    fn default() -> Self {
        Self {
            http_req_duration: 1000.0,
            http_req_blocked: 1000.0,
            http_req_failed: 1000.0,
            http_req_connecting: 1000.0,
            http_reqs: 100.0,
            http_req_check_failed: 100.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedMetrics {
    pub http_req_duration: f64,
    pub http_req_blocked: f64,
    pub http_req_failed: f64,
    pub http_req_connecting: f64,
    pub http_reqs: f64,
    pub http_req_check_failed: f64,
}

/// Every intermediate value of the combine step.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub duration: f64,
    pub blocked: f64,
    pub failed: f64,
    pub check_failed: f64,
    pub positive_sum: f64,
    pub negative_sum: f64,
    /// `positive_sum - negative_sum`, before clamping.
    pub raw: f64,
    /// Never negative.
    pub score: f64,
}

/// Result of scoring one set of averages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Evaluation {
    pub normalized: NormalizedMetrics,
    pub breakdown: ScoreBreakdown,
}

/// Receives intermediate values while a score is computed.
///
/// Observers see copies of the data; they cannot influence the result.
pub trait ScoreObserver {
    fn normalized(&mut self, _normalized: &NormalizedMetrics) {}
    fn scored(&mut self, _breakdown: &ScoreBreakdown) {}
}

/// Observes nothing.
impl ScoreObserver for () {}

/// Emits intermediate values as `debug` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl ScoreObserver for TracingObserver {
    fn normalized(&mut self, n: &NormalizedMetrics) {
        tracing::debug!(
            http_req_duration = n.http_req_duration,
            http_req_blocked = n.http_req_blocked,
            http_req_failed = n.http_req_failed,
            http_req_connecting = n.http_req_connecting,
            http_reqs = n.http_reqs,
            http_req_check_failed = n.http_req_check_failed,
            "normalized metrics"
        );
    }

    fn scored(&mut self, b: &ScoreBreakdown) {
        tracing::debug!(
            duration = b.duration,
            blocked = b.blocked,
            failed = b.failed,
            check_failed = b.check_failed,
            positive_sum = b.positive_sum,
            negative_sum = b.negative_sum,
            raw = b.raw,
            "score terms"
        );
    }
}

/// Projects `value` onto its scale. Zero (and NaN) short-circuit to zero.
pub fn normalize(value: f64, scale: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        return 0.0;
    }
    value / scale
}

/// Weighted contribution of one normalized quantity. See the module docs for
/// the shape of this function.
pub fn score_term(value: f64, weight: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        return 0.0;
    }
    let clamped = value.min(1.0);
    weight * (weight - clamped) * 100.0
}

/// Turns averaged metrics into a score.
///
/// ```rust
/// use loadscore::{AveragedMetrics, Scorer};
///
/// let scorer = Scorer::builder().build();
/// let averaged = AveragedMetrics {
///     http_req_duration: 500.0,
///     ..Default::default()
/// };
/// assert_eq!(scorer.score(&averaged), 50.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, TypedBuilder)]
pub struct Scorer {
    #[builder(default)]
    pub weights: Weights,
    #[builder(default)]
    pub scales: Scales,
}

impl Scorer {
    pub fn normalize(&self, averaged: &AveragedMetrics) -> NormalizedMetrics {
        let s = &self.scales;
        NormalizedMetrics {
            http_req_duration: normalize(averaged.http_req_duration, s.http_req_duration),
            http_req_blocked: normalize(averaged.http_req_blocked, s.http_req_blocked),
            http_req_failed: normalize(UNTRACKED, s.http_req_failed),
            http_req_connecting: normalize(UNTRACKED, s.http_req_connecting),
            http_reqs: normalize(UNTRACKED, s.http_reqs),
            http_req_check_failed: normalize(
                averaged.http_req_check_failed,
                s.http_req_check_failed,
            ),
        }
    }

    pub fn combine(&self, normalized: &NormalizedMetrics) -> ScoreBreakdown {
        let w = &self.weights;
        let duration = score_term(normalized.http_req_duration, w.duration);
        let blocked = score_term(normalized.http_req_blocked, w.blocked);
        let failed = score_term(normalized.http_req_failed, w.failed);
        let check_failed = score_term(normalized.http_req_check_failed, w.check_failed);

        let negative_sum = blocked + failed + check_failed;
        let positive_sum = duration;
        let raw = positive_sum - negative_sum;

        ScoreBreakdown {
            duration,
            blocked,
            failed,
            check_failed,
            positive_sum,
            negative_sum,
            raw,
            score: raw.max(0.0),
        }
    }

    /// Normalizes and combines, reporting both steps to `observer`.
    pub fn evaluate<O: ScoreObserver>(
        &self,
        averaged: &AveragedMetrics,
        observer: &mut O,
    ) -> Evaluation {
        let normalized = self.normalize(averaged);
        observer.normalized(&normalized);
        let breakdown = self.combine(&normalized);
        observer.scored(&breakdown);
        Evaluation {
            normalized,
            breakdown,
        }
    }

    pub fn score(&self, averaged: &AveragedMetrics) -> f64 {
        self.evaluate(averaged, &mut ()).breakdown.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[derive(Default)]
    struct Recorder {
        normalized: Vec<NormalizedMetrics>,
        scored: Vec<ScoreBreakdown>,
    }

    impl ScoreObserver for Recorder {
        fn normalized(&mut self, n: &NormalizedMetrics) {
            self.normalized.push(*n);
        }
        fn scored(&mut self, b: &ScoreBreakdown) {
            self.scored.push(*b);
        }
    }

    #[test]
    fn normalize_short_circuits_zero() {
        assert_eq!(normalize(0.0, 1000.0), 0.0);
        assert_eq!(normalize(f64::NAN, 1000.0), 0.0);
        assert_eq!(normalize(500.0, 1000.0), 0.5);
        assert_eq!(normalize(1.0, 100.0), 0.01);
    }

    #[test]
    fn score_term_shape() {
        assert_eq!(score_term(0.5, 1.0), 50.0);
        assert_eq!(score_term(1.0, 1.0), 0.0);
        assert!(close(score_term(0.01, 0.4), 15.6));
        // past the weight the term turns negative
        assert!(close(score_term(1.0, 0.2), -16.0));
        assert_eq!(score_term(f64::NAN, 0.4), 0.0);
    }

    #[test]
    fn untracked_quantities_always_normalize_to_zero() {
        let averaged = AveragedMetrics {
            http_req_duration: 123.0,
            http_req_blocked: 45.0,
            http_req_check_failed: 1.0,
        };
        let n = Scorer::default().normalize(&averaged);
        assert_eq!(n.http_req_failed, 0.0);
        assert_eq!(n.http_req_connecting, 0.0);
        assert_eq!(n.http_reqs, 0.0);
    }

    #[test]
    fn empty_averages_score_zero() {
        let eval = Scorer::default().evaluate(&AveragedMetrics::default(), &mut ());
        assert_eq!(eval.normalized, NormalizedMetrics::default());
        assert_eq!(eval.breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn duration_only_scores_fifty() {
        let averaged = AveragedMetrics {
            http_req_duration: 500.0,
            ..Default::default()
        };
        let b = Scorer::default().evaluate(&averaged, &mut ()).breakdown;
        assert_eq!(b.duration, 50.0);
        assert_eq!(b.negative_sum, 0.0);
        assert_eq!(b.score, 50.0);
        assert_eq!(format!("{:.4}", b.score), "50.0000");
    }

    #[test]
    fn single_failed_check_clamps_to_zero() {
        let averaged = AveragedMetrics {
            http_req_check_failed: 1.0,
            ..Default::default()
        };
        let b = Scorer::default().evaluate(&averaged, &mut ()).breakdown;
        assert!(close(b.check_failed, 15.6));
        assert!(close(b.raw, -15.6));
        assert_eq!(b.score, 0.0);
        assert_eq!(format!("{:.4}", b.score), "0.0000");
    }

    #[test]
    fn observer_sees_both_steps_without_changing_result() {
        let averaged = AveragedMetrics {
            http_req_duration: 250.0,
            http_req_blocked: 100.0,
            http_req_check_failed: 0.5,
        };
        let scorer = Scorer::default();
        let mut recorder = Recorder::default();
        let observed = scorer.evaluate(&averaged, &mut recorder);

        assert_eq!(observed, scorer.evaluate(&averaged, &mut ()));
        assert_eq!(recorder.normalized, vec![observed.normalized]);
        assert_eq!(recorder.scored, vec![observed.breakdown]);
        assert_eq!(observed, scorer.evaluate(&averaged, &mut TracingObserver));
    }

    #[test]
    fn builder_overrides_weights() {
        let scorer = Scorer::builder()
            .weights(Weights {
                duration: 2.0,
                ..Default::default()
            })
            .build();
        assert_eq!(scorer.scales, Scales::default());
        let averaged = AveragedMetrics {
            http_req_duration: 500.0,
            ..Default::default()
        };
        assert_eq!(scorer.score(&averaged), 300.0);
    }

    proptest! {
        #[test]
        fn zero_value_term_is_zero(weight in -10.0f64..10.0) {
            prop_assert_eq!(score_term(0.0, weight), 0.0);
        }

        #[test]
        fn terms_clamp_above_one(value in 1.0f64..1e12, weight in 0.0f64..2.0) {
            prop_assert_eq!(score_term(value, weight), score_term(1.0, weight));
        }

        #[test]
        fn score_is_never_negative(
            duration in -1e6f64..1e6,
            blocked in -1e6f64..1e6,
            check_failed in -1e4f64..1e4,
        ) {
            let averaged = AveragedMetrics {
                http_req_duration: duration,
                http_req_blocked: blocked,
                http_req_check_failed: check_failed,
            };
            prop_assert!(Scorer::default().score(&averaged) >= 0.0);
        }
    }
}
