//! Keyword-overlap checker.
//!
//! Scores an answer by how many of the query's unique whitespace tokens
//! reappear in the answer. A grounded answer usually echoes some of the
//! question's vocabulary; an answer sharing almost nothing with the query
//! is a strong cheap signal that the agent went off the rails.

use std::collections::HashSet;
use std::time::Instant;

use super::Checker;
use crate::types::{EvaluationContext, StageResult};

pub const OVERLAP_CHECKER_NAME: &str = "overlap-checker";

/// Default minimum fraction of query tokens expected in the answer.
pub const DEFAULT_MIN_OVERLAP: f64 = 0.1;

/// Scores the fraction of unique query tokens that appear in the answer.
#[derive(Debug, Clone)]
pub struct OverlapChecker {
    min_overlap: f64,
}

impl OverlapChecker {
    pub fn new() -> Self {
        Self {
            min_overlap: DEFAULT_MIN_OVERLAP,
        }
    }

    /// Override the low-overlap reporting threshold.
    pub fn with_threshold(min_overlap: f64) -> Self {
        Self { min_overlap }
    }
}

impl Default for OverlapChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for OverlapChecker {
    fn name(&self) -> &str {
        OVERLAP_CHECKER_NAME
    }

    fn check(&self, ctx: &EvaluationContext) -> StageResult {
        let started = Instant::now();

        // Empty inputs are a deterministic business rule, not an error.
        let query_tokens: HashSet<&str> = ctx.query.split_whitespace().collect();
        if query_tokens.is_empty() {
            return StageResult::failed(self.name(), "Empty query", started.elapsed());
        }

        let answer_tokens: HashSet<&str> = ctx.answer.split_whitespace().collect();
        if answer_tokens.is_empty() {
            return StageResult::failed(self.name(), "Empty answer", started.elapsed());
        }

        let shared = query_tokens
            .iter()
            .filter(|token| answer_tokens.contains(*token))
            .count();
        let score = shared as f64 / query_tokens.len() as f64;

        let reason = if score < self.min_overlap {
            format!(
                "Low keyword overlap: {:.0}% of query terms found in answer",
                score * 100.0
            )
        } else {
            "Sufficient keyword overlap between query and answer".to_string()
        };

        StageResult::new(self.name(), score, reason, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ctx(query: &str, answer: &str) -> EvaluationContext {
        EvaluationContext {
            request_id: "test".to_string(),
            query: query.to_string(),
            context: String::new(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_query_scores_zero_with_named_reason() {
        let result = OverlapChecker::new().check(&ctx("", "Some answer"));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, "Empty query");
    }

    #[test]
    fn whitespace_only_query_counts_as_empty() {
        let result = OverlapChecker::new().check(&ctx("   \t ", "Some answer"));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, "Empty query");
    }

    #[test]
    fn empty_answer_scores_zero_with_named_reason() {
        let result = OverlapChecker::new().check(&ctx("What is encryption?", ""));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, "Empty answer");
    }

    #[test]
    fn full_overlap_scores_one() {
        let result = OverlapChecker::new().check(&ctx("alpha beta gamma", "gamma beta alpha"));
        assert_eq!(result.score, 1.0);
        assert_eq!(result.name, "overlap-checker");
    }

    #[test]
    fn duplicate_query_tokens_count_once() {
        // Unique query tokens: {the, cat}. Both appear in the answer.
        let result = OverlapChecker::new().check(&ctx("the the the cat", "the cat sat"));
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn partial_overlap_scores_the_shared_fraction() {
        // Query tokens: {what, is, the, capital, of, France?} — "is", "the"
        // and "capital" (not "capital.") appear in the answer.
        let result = OverlapChecker::new().check(&ctx(
            "What is the capital of France?",
            "Paris is the capital city",
        ));
        assert!((result.score - 0.5).abs() < 1e-9);
        assert!(result.score > DEFAULT_MIN_OVERLAP);
    }

    #[test]
    fn low_overlap_reports_percentage_reason() {
        let checker = OverlapChecker::with_threshold(0.5);
        let result = checker.check(&ctx("one two three four", "four unrelated words here"));
        assert!((result.score - 0.25).abs() < 1e-9);
        assert!(result.reason.starts_with("Low keyword overlap"));
        assert!(result.reason.contains("25%"));
    }

    #[test]
    fn no_overlap_scores_zero_but_is_not_an_error() {
        let result = OverlapChecker::new().check(&ctx("alpha beta", "gamma delta"));
        assert_eq!(result.score, 0.0);
        assert!(result.reason.starts_with("Low keyword overlap"));
    }
}
