//! Deterministic stage checkers.
//!
//! A checker is the cheap, non-LLM half of the pipeline: a pure function
//! over an [`EvaluationContext`] that always produces a [`StageResult`].
//! Checkers run before any judge and gate the expensive LLM calls, so they
//! must stay synchronous and fast.

use crate::types::{EvaluationContext, StageResult};

mod leakage;
mod overlap;

pub use leakage::LeakageChecker;
pub use overlap::OverlapChecker;

/// A single deterministic check against an evaluation context.
///
/// # Contract
/// - Read-only with respect to the context; side-effect-free apart from
///   the checker's own timing measurement.
/// - Never fails: business-rule misses and internal problems alike are
///   encoded as a score-0 [`StageResult`] with a descriptive reason.
/// - Stateless and reusable across concurrent evaluations.
pub trait Checker: Send + Sync {
    /// Stable identity reported in every result this checker produces.
    fn name(&self) -> &str;

    fn check(&self, ctx: &EvaluationContext) -> StageResult;
}
