//! Completeness judge: does the answer address every part of the query?

use arbiter_core::{EvaluationContext, StageResult};
use async_trait::async_trait;
use std::sync::Arc;

use super::{completion_config, score_against_provider, Judge};
use crate::config::JudgeConfig;
use crate::prompts;
use crate::providers::{CompletionConfig, LlmProvider};

pub const COMPLETENESS_JUDGE_NAME: &str = "completeness-judge";

pub struct CompletenessJudge {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl CompletenessJudge {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &JudgeConfig) -> Self {
        Self {
            provider,
            completion: completion_config(config),
        }
    }
}

#[async_trait]
impl Judge for CompletenessJudge {
    fn name(&self) -> &str {
        COMPLETENESS_JUDGE_NAME
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> StageResult {
        let prompt = prompts::completeness_prompt(&ctx.query, &ctx.answer);
        score_against_provider(self.name(), self.provider.as_ref(), &self.completion, prompt).await
    }
}
