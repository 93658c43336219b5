//! # arbiter-runtime
//!
//! LLM-judged batch evaluation for AI-agent responses.
//!
//! This crate layers the asynchronous half of the pipeline on top of
//! `arbiter-core`: LLM judges behind a provider capability, fan-out
//! runners, the per-request executor, and the batch subsystem (reader,
//! bounded worker pool, writers).
//!
//! ## Pipeline
//!
//! ```text
//! reader -> processor (N workers) -> executor per request
//!             stage checks -> early exit | judges -> aggregate
//!           -> result stream -> writer
//! ```
//!
//! Two nested levels of concurrency: across requests (the worker pool)
//! and within one request (checker/judge fan-out). Cancellation is
//! cooperative — intake loops stop promptly, in-flight judge calls run
//! to completion.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arbiter_core::{Aggregator, LeakageChecker, OverlapChecker};
//! use arbiter_runtime::{
//!     batch::{read_records, CancelToken, Processor},
//!     config::RuntimeConfig,
//!     executor::Executor,
//!     judges::{CoherenceJudge, CompletenessJudge, FaithfulnessJudge},
//!     providers::AnthropicProvider,
//!     runner::{JudgeRunner, StageRunner},
//! };
//!
//! let config = RuntimeConfig::default();
//! let provider = Arc::new(AnthropicProvider::from_env()?);
//! let executor = Arc::new(Executor::new(
//!     StageRunner::new(vec![Arc::new(OverlapChecker::new()), Arc::new(LeakageChecker::new())]),
//!     JudgeRunner::new(vec![
//!         Arc::new(CompletenessJudge::new(provider.clone(), &config.judge)),
//!         Arc::new(FaithfulnessJudge::new(provider.clone(), &config.judge)),
//!         Arc::new(CoherenceJudge::new(provider.clone(), &config.judge)),
//!     ]),
//!     Aggregator::new(config.weights()),
//!     config.early_exit_threshold,
//! ));
//!
//! let cancel = CancelToken::new();
//! let records = read_records(input, &cancel).await?;
//! let mut results = Processor::new(executor, config.workers).process(records, cancel);
//! while let Some(result) = results.recv().await {
//!     println!("{}: {}", result.id, result.verdict);
//! }
//! ```

pub mod batch;
pub mod config;
pub mod executor;
pub mod judges;
pub mod prompts;
pub mod providers;
pub mod runner;

pub use batch::{
    read_records, writer_for, CancelToken, InputRecord, JsonlWriter, OutputFormat, Processor,
    ResultWriter, SummaryStats, SummaryWriter, WriteError,
};
pub use config::{JudgeConfig, RuntimeConfig};
pub use executor::Executor;
pub use judges::{CoherenceJudge, CompletenessJudge, FaithfulnessJudge, Judge};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
pub use runner::{JudgeRunner, StageRunner};

#[cfg(feature = "anthropic")]
pub use providers::AnthropicProvider;
