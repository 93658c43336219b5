//! Coherence judge: is the answer internally consistent?

use arbiter_core::{EvaluationContext, StageResult};
use async_trait::async_trait;
use std::sync::Arc;

use super::{completion_config, score_against_provider, Judge};
use crate::config::JudgeConfig;
use crate::prompts;
use crate::providers::{CompletionConfig, LlmProvider};

pub const COHERENCE_JUDGE_NAME: &str = "coherence-judge";

pub struct CoherenceJudge {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl CoherenceJudge {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &JudgeConfig) -> Self {
        Self {
            provider,
            completion: completion_config(config),
        }
    }
}

#[async_trait]
impl Judge for CoherenceJudge {
    fn name(&self) -> &str {
        COHERENCE_JUDGE_NAME
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> StageResult {
        let prompt = prompts::coherence_prompt(&ctx.answer);
        score_against_provider(self.name(), self.provider.as_ref(), &self.completion, prompt).await
    }
}
