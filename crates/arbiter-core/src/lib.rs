//! # arbiter-core
//!
//! Deterministic evaluation primitives for AI-agent responses.
//!
//! This crate holds everything in the pipeline that needs no I/O and no
//! LLM: the data model, the cheap stage checkers, score aggregation, and
//! the offline annotation validator.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same input always produces the same output
//! 2. **No LLM calls**: judges live in `arbiter-runtime`, never here
//! 3. **Infallible evaluators**: a checker always yields a `StageResult`;
//!    internal problems become score-0 results, not errors
//! 4. **Parallel-safe**: checkers are stateless and contexts are never
//!    shared between evaluations
//!
//! ## Example
//!
//! ```rust,ignore
//! use arbiter_core::{Aggregator, Checker, EvaluationContext, OverlapChecker, Weights};
//!
//! let ctx = EvaluationContext::from_request(&request);
//! let stage = OverlapChecker::new().check(&ctx);
//! let result = Aggregator::new(Weights::default())
//!     .aggregate(ctx.request_id.clone(), vec![stage], judge_results);
//! println!("{}: {}", result.id, result.verdict);
//! ```

pub mod aggregator;
pub mod checkers;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use aggregator::{mean_score, Aggregator, Weights};
pub use checkers::{Checker, LeakageChecker, OverlapChecker};
pub use types::{
    AgentInfo, EvaluationContext, EvaluationRequest, EvaluationResult, EventType, Interaction,
    StageResult, Verdict,
};
pub use validation::{
    compute_kendall_tau, confusion_matrix, interpret_tau, validate_annotations, AnnotationPair,
    ValidationError, ValidationResult,
};
