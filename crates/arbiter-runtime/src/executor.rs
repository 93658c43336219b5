//! Per-request evaluation state machine.
//!
//! One evaluation runs through a fixed, linear sequence: stage checks,
//! then either an early exit or the judge fan-out, then aggregation. The
//! early exit is a plain branch on the mean stage score — obviously bad
//! answers never reach the LLM.

use arbiter_core::{mean_score, Aggregator, EvaluationContext, EvaluationResult, Verdict};

use crate::runner::{JudgeRunner, StageRunner};

/// Orchestrates one evaluation end-to-end. No state is shared across
/// requests; the executor itself is immutable and reused by every worker.
pub struct Executor {
    stage_runner: StageRunner,
    judge_runner: JudgeRunner,
    aggregator: Aggregator,
    early_exit_threshold: f64,
}

impl Executor {
    pub fn new(
        stage_runner: StageRunner,
        judge_runner: JudgeRunner,
        aggregator: Aggregator,
        early_exit_threshold: f64,
    ) -> Self {
        Self {
            stage_runner,
            judge_runner,
            aggregator,
            early_exit_threshold,
        }
    }

    pub async fn execute(&self, ctx: EvaluationContext) -> EvaluationResult {
        let id = ctx.request_id.clone();

        let stage_results = self.stage_runner.run(&ctx).await;

        // No checkers ran at all: fatal for this request, not retried.
        if stage_results.is_empty() {
            tracing::warn!(id = %id, "no stage results produced");
            return EvaluationResult {
                id,
                stages: Vec::new(),
                confidence: 0.0,
                verdict: Verdict::Fail,
            };
        }

        let stage_mean = mean_score(&stage_results);
        if stage_mean < self.early_exit_threshold {
            tracing::debug!(
                id = %id,
                stage_mean,
                threshold = self.early_exit_threshold,
                "early exit, skipping judges"
            );
            return EvaluationResult {
                id,
                stages: stage_results,
                confidence: 0.0,
                verdict: Verdict::Fail,
            };
        }

        let judge_results = self.judge_runner.run(&ctx).await;

        self.aggregator.aggregate(id, stage_results, judge_results)
    }
}
