//! Fan-out/fan-in runners for checkers and judges.
//!
//! Both runners share the same contract: execute every registered
//! evaluator concurrently against one context and return the complete
//! result set once all of them have finished. No result ordering is
//! guaranteed and none is needed downstream — the aggregator only
//! consumes means.
//!
//! Evaluator execution is strictly isolated: each one runs in its own
//! task, and a panic is caught at the join point and downgraded to a
//! score-0 result so the other evaluators keep their slots.

use arbiter_core::{Checker, EvaluationContext, StageResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::judges::Judge;

/// Runs all registered checkers concurrently.
///
/// Checkers are synchronous by design (they must stay cheap), so each
/// one is dispatched to the blocking pool.
pub struct StageRunner {
    checkers: Vec<Arc<dyn Checker>>,
}

impl StageRunner {
    pub fn new(checkers: Vec<Arc<dyn Checker>>) -> Self {
        Self { checkers }
    }

    /// One [`StageResult`] per registered checker, in completion-dependent
    /// order. An empty checker set yields an empty collection.
    pub async fn run(&self, ctx: &EvaluationContext) -> Vec<StageResult> {
        let ctx = Arc::new(ctx.clone());

        let tasks: Vec<_> = self
            .checkers
            .iter()
            .map(|checker| {
                let checker = Arc::clone(checker);
                let ctx = Arc::clone(&ctx);
                let name = checker.name().to_string();
                let handle = tokio::task::spawn_blocking(move || checker.check(&ctx));
                (name, handle)
            })
            .collect();

        collect_results(tasks).await
    }
}

/// Runs all registered judges concurrently.
pub struct JudgeRunner {
    judges: Vec<Arc<dyn Judge>>,
}

impl JudgeRunner {
    pub fn new(judges: Vec<Arc<dyn Judge>>) -> Self {
        Self { judges }
    }

    /// One [`StageResult`] per registered judge; judges encode their own
    /// failures, so the only thing caught here is a panic.
    pub async fn run(&self, ctx: &EvaluationContext) -> Vec<StageResult> {
        let ctx = Arc::new(ctx.clone());

        let tasks: Vec<_> = self
            .judges
            .iter()
            .map(|judge| {
                let judge = Arc::clone(judge);
                let ctx = Arc::clone(&ctx);
                let name = judge.name().to_string();
                let handle = tokio::spawn(async move { judge.evaluate(&ctx).await });
                (name, handle)
            })
            .collect();

        collect_results(tasks).await
    }
}

/// Join every task, keeping one slot per evaluator: a panicked task
/// becomes a score-0 result named after the evaluator that lost it.
async fn collect_results(
    tasks: Vec<(String, tokio::task::JoinHandle<StageResult>)>,
) -> Vec<StageResult> {
    let (names, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();

    names
        .into_iter()
        .zip(join_all(handles).await)
        .map(|(name, outcome)| match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(evaluator = %name, error = %err, "evaluator task failed");
                StageResult::failed(
                    name,
                    format!("Evaluator panicked: {err}"),
                    Duration::ZERO,
                )
            }
        })
        .collect()
}
