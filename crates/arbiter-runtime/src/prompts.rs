//! Scoring prompts for the LLM judges.
//!
//! All judges share one system prompt that pins the response contract:
//! a bare JSON object with a `score` and a `reason`. Each variant then
//! injects only the context fields its quality dimension needs —
//! completeness reads query and answer, faithfulness reads context and
//! answer, coherence reads the answer alone.

/// Base system prompt shared across all judges.
///
/// The framing matters: the judge scores one narrow dimension against the
/// material it is given. It does not judge overall quality and it does
/// not invent criteria.
pub const SCORING_SYSTEM_PROMPT: &str = r#"
You are an evaluation judge scoring one quality dimension of an AI agent's answer.

## Constraints
1. Score ONLY the dimension described in the task - nothing else
2. Base the score ONLY on the material provided - do not use outside knowledge
3. A score of 1.0 means the dimension is fully satisfied, 0.0 means not at all

## Output Format
Respond with a single JSON object and nothing else:
{"score": <float between 0.0 and 1.0>, "reason": "<one or two sentences citing the material>"}

No markdown fences, no prose before or after the object.
"#;

/// Completeness: does the answer address every part of the query?
pub fn completeness_prompt(query: &str, answer: &str) -> String {
    format!(
        r#"## Dimension: Completeness

Does the answer address every part of the user's query? Partially
addressed or ignored sub-questions lower the score proportionally.

## User Query
{query}

## Agent Answer
{answer}"#
    )
}

/// Faithfulness: is the answer grounded in the supplied context?
pub fn faithfulness_prompt(context: &str, answer: &str) -> String {
    format!(
        r#"## Dimension: Faithfulness

Is every claim in the answer supported by the provided context? Facts
that do not appear in the context lower the score, even if they happen
to be true.

## Context
{context}

## Agent Answer
{answer}"#
    )
}

/// Coherence: is the answer internally consistent and well-formed?
pub fn coherence_prompt(answer: &str) -> String {
    format!(
        r#"## Dimension: Coherence

Is the answer logically consistent, free of contradictions, and readable
as a single coherent response?

## Agent Answer
{answer}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_injects_query_and_answer() {
        let prompt = completeness_prompt("the query text", "the answer text");
        assert!(prompt.contains("the query text"));
        assert!(prompt.contains("the answer text"));
    }

    #[test]
    fn faithfulness_injects_context_and_answer() {
        let prompt = faithfulness_prompt("the context text", "the answer text");
        assert!(prompt.contains("the context text"));
        assert!(prompt.contains("the answer text"));
    }

    #[test]
    fn coherence_injects_only_the_answer() {
        let prompt = coherence_prompt("the answer text");
        assert!(prompt.contains("the answer text"));
    }

    #[test]
    fn system_prompt_pins_the_json_contract() {
        assert!(SCORING_SYSTEM_PROMPT.contains(r#"{"score""#));
    }
}
