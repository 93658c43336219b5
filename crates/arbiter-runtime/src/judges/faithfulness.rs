//! Faithfulness judge: is the answer grounded in the supplied context?

use arbiter_core::{EvaluationContext, StageResult};
use async_trait::async_trait;
use std::sync::Arc;

use super::{completion_config, score_against_provider, Judge};
use crate::config::JudgeConfig;
use crate::prompts;
use crate::providers::{CompletionConfig, LlmProvider};

pub const FAITHFULNESS_JUDGE_NAME: &str = "faithfulness-judge";

pub struct FaithfulnessJudge {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl FaithfulnessJudge {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &JudgeConfig) -> Self {
        Self {
            provider,
            completion: completion_config(config),
        }
    }
}

#[async_trait]
impl Judge for FaithfulnessJudge {
    fn name(&self) -> &str {
        FAITHFULNESS_JUDGE_NAME
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> StageResult {
        let prompt = prompts::faithfulness_prompt(&ctx.context, &ctx.answer);
        score_against_provider(self.name(), self.provider.as_ref(), &self.completion, prompt).await
    }
}
