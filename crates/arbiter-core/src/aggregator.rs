//! Score aggregation: stage and judge results in, final verdict out.
//!
//! The aggregator is the deterministic fan-in of the pipeline. It only
//! consumes the mean of each result set, never positional data, so it is
//! insensitive to the order in which concurrent evaluators completed.

use crate::types::{EvaluationResult, StageResult, Verdict};

/// Blend weights for the two evaluation stages.
///
/// By convention the weights sum to 1.0 so that confidence stays in
/// [0, 1], but this is not validated: callers own the convention, and a
/// deliberately over- or under-weighted blend is accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    /// Weight applied to the mean deterministic stage-check score.
    pub stage: f64,
    /// Weight applied to the mean judge score.
    pub judge: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            stage: 0.4,
            judge: 0.6,
        }
    }
}

/// Combines stage-check and judge scores into one confidence value and
/// maps it to a verdict.
#[derive(Debug, Clone)]
pub struct Aggregator {
    weights: Weights,
}

impl Aggregator {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    /// Aggregate both result sets into the final [`EvaluationResult`].
    ///
    /// If either set is empty there is nothing meaningful to blend: the
    /// result carries every collected stage, confidence 0, and the
    /// [`Verdict::Unevaluated`] sentinel instead of risking a division by
    /// zero.
    pub fn aggregate(
        &self,
        id: impl Into<String>,
        stage_results: Vec<StageResult>,
        judge_results: Vec<StageResult>,
    ) -> EvaluationResult {
        if stage_results.is_empty() || judge_results.is_empty() {
            let mut stages = stage_results;
            stages.extend(judge_results);
            return EvaluationResult {
                id: id.into(),
                stages,
                confidence: 0.0,
                verdict: Verdict::Unevaluated,
            };
        }

        let stage_mean = mean_score(&stage_results);
        let judge_mean = mean_score(&judge_results);
        let confidence = stage_mean * self.weights.stage + judge_mean * self.weights.judge;

        let mut stages = stage_results;
        stages.extend(judge_results);

        EvaluationResult {
            id: id.into(),
            stages,
            confidence,
            verdict: verdict_for(confidence),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Weights::default())
    }
}

/// Arithmetic mean of a non-empty result set's scores.
pub fn mean_score(results: &[StageResult]) -> f64 {
    results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64
}

/// Map a confidence value to its verdict. Both boundaries are exclusive
/// on the high side: 0.80 is review, 0.50 is fail.
fn verdict_for(confidence: f64) -> Verdict {
    if confidence > 0.8 {
        Verdict::Pass
    } else if confidence > 0.5 {
        Verdict::Review
    } else {
        Verdict::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(name: &str, score: f64) -> StageResult {
        StageResult::new(name, score, "test", Duration::from_nanos(1))
    }

    #[test]
    fn verdict_boundaries_are_exclusive_on_the_high_side() {
        assert_eq!(verdict_for(0.81), Verdict::Pass);
        assert_eq!(verdict_for(0.80), Verdict::Review);
        assert_eq!(verdict_for(0.51), Verdict::Review);
        assert_eq!(verdict_for(0.50), Verdict::Fail);
        assert_eq!(verdict_for(0.0), Verdict::Fail);
        assert_eq!(verdict_for(1.0), Verdict::Pass);
    }

    #[test]
    fn blends_means_with_configured_weights() {
        let aggregator = Aggregator::new(Weights {
            stage: 0.4,
            judge: 0.6,
        });

        let aggregated = aggregator.aggregate(
            "evt-1",
            vec![result("overlap-checker", 0.5), result("leakage-checker", 1.0)],
            vec![result("completeness-judge", 0.9)],
        );

        // 0.75 * 0.4 + 0.9 * 0.6 = 0.84
        assert!((aggregated.confidence - 0.84).abs() < 1e-9);
        assert_eq!(aggregated.verdict, Verdict::Pass);
        assert_eq!(aggregated.stages.len(), 3);
        assert_eq!(aggregated.id, "evt-1");
    }

    #[test]
    fn empty_judge_set_short_circuits_to_sentinel() {
        let aggregated =
            Aggregator::default().aggregate("evt-2", vec![result("overlap-checker", 0.9)], vec![]);

        assert_eq!(aggregated.confidence, 0.0);
        assert_eq!(aggregated.verdict, Verdict::Unevaluated);
        // Collected stage results still travel with the sentinel.
        assert_eq!(aggregated.stages.len(), 1);
    }

    #[test]
    fn empty_stage_set_short_circuits_to_sentinel() {
        let aggregated =
            Aggregator::default().aggregate("evt-3", vec![], vec![result("coherence-judge", 0.9)]);

        assert_eq!(aggregated.confidence, 0.0);
        assert_eq!(aggregated.verdict, Verdict::Unevaluated);
    }

    #[test]
    fn both_sets_empty_short_circuits_to_sentinel() {
        let aggregated = Aggregator::default().aggregate("evt-4", vec![], vec![]);

        assert_eq!(aggregated.confidence, 0.0);
        assert_eq!(aggregated.verdict, Verdict::Unevaluated);
        assert!(aggregated.stages.is_empty());
    }

    #[test]
    fn stage_order_does_not_change_confidence() {
        let aggregator = Aggregator::default();
        let a = aggregator.aggregate(
            "evt-5",
            vec![result("a", 0.2), result("b", 0.8)],
            vec![result("c", 0.6)],
        );
        let b = aggregator.aggregate(
            "evt-5",
            vec![result("b", 0.8), result("a", 0.2)],
            vec![result("c", 0.6)],
        );
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.verdict, b.verdict);
    }

    #[test]
    fn weights_are_not_normalized() {
        // Deliberately over-weighted blend is accepted as-is.
        let aggregator = Aggregator::new(Weights {
            stage: 1.0,
            judge: 1.0,
        });
        let aggregated = aggregator.aggregate(
            "evt-6",
            vec![result("a", 0.6)],
            vec![result("b", 0.6)],
        );
        assert!((aggregated.confidence - 1.2).abs() < 1e-9);
        assert_eq!(aggregated.verdict, Verdict::Pass);
    }
}
