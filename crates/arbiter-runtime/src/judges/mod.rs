//! LLM-backed judges.
//!
//! A judge scores one quality dimension of an answer by sending a fixed
//! prompt template to an LLM and parsing a `{"score", "reason"}` object
//! out of the reply. Judges never propagate failures: a transport error,
//! an unparseable reply, and a reply missing both fields each degrade to
//! a score-0 [`StageResult`] with its own distinct reason, so one broken
//! call can never sink the surrounding evaluation.
//!
//! Decoding is pinned for every variant: temperature 0 and a 256-token
//! budget. Only the prompt template and the injected context fields
//! differ between judges. Retrying is explicitly not done here; if a
//! caller wants retries, it wraps the provider.

use arbiter_core::{EvaluationContext, StageResult};
use async_trait::async_trait;
use std::time::Instant;

use crate::config::JudgeConfig;
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider};
use crate::prompts::SCORING_SYSTEM_PROMPT;

mod coherence;
mod completeness;
mod faithfulness;

pub use coherence::{CoherenceJudge, COHERENCE_JUDGE_NAME};
pub use completeness::{CompletenessJudge, COMPLETENESS_JUDGE_NAME};
pub use faithfulness::{FaithfulnessJudge, FAITHFULNESS_JUDGE_NAME};

/// Token budget shared by every judge call.
pub const JUDGE_MAX_TOKENS: u32 = 256;

/// Decoding temperature shared by every judge call.
pub const JUDGE_TEMPERATURE: f32 = 0.0;

/// Reason reported when the underlying LLM call fails.
pub const REASON_CALL_FAILED: &str = "Failed to call LLM";

/// Reason reported when the reply is not a JSON object at all.
pub const REASON_DESERIALIZE_FAILED: &str = "Failed to deserialize LLM response";

/// Reason reported when the reply is valid JSON but carries neither a
/// score nor a reason.
pub const REASON_MISSING_FIELDS: &str = "Invalid LLM response: missing score and reason";

/// An LLM-backed evaluator for one quality dimension.
///
/// # Contract
/// - May suspend on network I/O.
/// - Always returns a [`StageResult`]; internal failures are encoded as
///   score 0 with one of the reasons above.
/// - Never retries.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Stable identity reported in every result this judge produces.
    fn name(&self) -> &str;

    async fn evaluate(&self, ctx: &EvaluationContext) -> StageResult;
}

/// Completion settings for one judge instance: the caller-configurable
/// model and timeout combined with the fixed decoding parameters.
pub(crate) fn completion_config(config: &JudgeConfig) -> CompletionConfig {
    CompletionConfig {
        model: config.model.clone(),
        max_tokens: JUDGE_MAX_TOKENS,
        temperature: JUDGE_TEMPERATURE,
        timeout: config.timeout(),
    }
}

/// Send a scoring prompt and fold every possible outcome into a
/// [`StageResult`].
pub(crate) async fn score_against_provider(
    name: &str,
    provider: &dyn LlmProvider,
    completion: &CompletionConfig,
    prompt: String,
) -> StageResult {
    let started = Instant::now();

    let messages = vec![
        ChatMessage::system(SCORING_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];

    match provider.complete(messages, completion).await {
        Ok(response) => parse_score(name, &response.content, started),
        Err(err) => {
            tracing::warn!(judge = name, error = %err, "LLM call failed");
            StageResult::failed(name, REASON_CALL_FAILED, started.elapsed())
        }
    }
}

/// Parse the judge reply. Two distinct failure modes: content that is not
/// a JSON object, and a JSON object lacking both expected fields.
fn parse_score(name: &str, content: &str, started: Instant) -> StageResult {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(_) => return StageResult::failed(name, REASON_DESERIALIZE_FAILED, started.elapsed()),
    };

    let Some(object) = value.as_object() else {
        return StageResult::failed(name, REASON_DESERIALIZE_FAILED, started.elapsed());
    };

    let score = object.get("score").and_then(serde_json::Value::as_f64);
    let reason = object.get("reason").and_then(serde_json::Value::as_str);

    match (score, reason) {
        (None, None) => StageResult::failed(name, REASON_MISSING_FIELDS, started.elapsed()),
        (score, reason) => StageResult::new(
            name,
            score.unwrap_or(0.0),
            reason.unwrap_or_default(),
            started.elapsed(),
        ),
    }
}
