//! Core data model for agent-response evaluation.
//!
//! Everything here is created once, read many times, and discarded at the
//! end of a batch. `EvaluationRequest` is the raw wire shape, parsed
//! leniently so partial records still load. `EvaluationContext` is the
//! normalized form every checker and judge consumes; it is owned by exactly
//! one evaluation run and never mutated after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Three-level evaluation outcome, plus the sentinel for runs where no
/// stage or judge contributed a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Review,
    Fail,
    /// No evaluation was performed: either the stage set or the judge set
    /// was empty, so a confidence score would be meaningless.
    Unevaluated,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Review => "review",
            Verdict::Fail => "fail",
            Verdict::Unevaluated => "unevaluated",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event classification on the input stream. Informational only: the
/// pipeline evaluates every record the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AgentResponse,
    AgentError,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Metadata about the agent that produced the answer under evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub version: String,
}

/// The user query / supporting context / agent answer triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub user_query: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub answer: String,
}

/// One unit of work as received from the input stream.
///
/// Deserialization is deliberately lenient: every field is defaulted, so a
/// record carrying only an `event_id` and an `interaction` parses fine.
/// Records that are not JSON objects at all are rejected by serde and
/// surface as per-line parse errors in the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub agent: AgentInfo,
    #[serde(default)]
    pub interaction: Interaction,
}

/// Normalized evaluation input consumed by checkers and judges.
///
/// Derived once per request and owned exclusively by the evaluation run
/// that created it; never shared across concurrent evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub request_id: String,
    pub query: String,
    pub context: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl EvaluationContext {
    /// Normalize a request, stamping the current time as `created_at`.
    pub fn from_request(request: &EvaluationRequest) -> Self {
        Self {
            request_id: request.event_id.clone(),
            query: request.interaction.user_query.clone(),
            context: request.interaction.context.clone(),
            answer: request.interaction.answer.clone(),
            created_at: Utc::now(),
        }
    }
}

/// One checker's or judge's verdict on a single evaluation context.
///
/// Internal failures never escape an evaluator: they are encoded as a
/// score of 0 with a reason describing what went wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: String,
    pub score: f64,
    pub reason: String,
    #[serde(rename = "duration_ns", with = "duration_ns")]
    pub duration: Duration,
}

impl StageResult {
    pub fn new(
        name: impl Into<String>,
        score: f64,
        reason: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            score,
            reason: reason.into(),
            duration,
        }
    }

    /// A score-0 result for an evaluator that failed internally.
    pub fn failed(name: impl Into<String>, reason: impl Into<String>, duration: Duration) -> Self {
        Self::new(name, 0.0, reason, duration)
    }
}

/// Final output for one evaluated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub id: String,
    pub stages: Vec<StageResult>,
    pub confidence: f64,
    pub verdict: Verdict,
}

/// Serializes `std::time::Duration` as integer nanoseconds under the
/// `duration_ns` output key.
pub mod duration_ns {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_nanos().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_nanos(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_request_parses() {
        let line = r#"{"event_id":"evt-1","event_type":"agent_response","agent":{"name":"support-bot","type":"rag","version":"1.2.0"},"interaction":{"user_query":"What is encryption?","context":"Encryption encodes data.","answer":"It encodes data."}}"#;

        let request: EvaluationRequest = serde_json::from_str(line).unwrap();
        assert_eq!(request.event_id, "evt-1");
        assert_eq!(request.event_type, EventType::AgentResponse);
        assert_eq!(request.agent.kind, "rag");
        assert_eq!(request.interaction.user_query, "What is encryption?");
    }

    #[test]
    fn partial_request_parses_with_defaults() {
        let line = r#"{"event_id":"1","interaction":{"user_query":"What is the capital of France?","answer":"Paris is the capital."}}"#;

        let request: EvaluationRequest = serde_json::from_str(line).unwrap();
        assert_eq!(request.event_id, "1");
        assert_eq!(request.event_type, EventType::Unknown);
        assert_eq!(request.agent, AgentInfo::default());
        assert_eq!(request.interaction.context, "");
        assert_eq!(request.interaction.answer, "Paris is the capital.");
    }

    #[test]
    fn unknown_event_type_is_tolerated() {
        let line = r#"{"event_id":"1","event_type":"something_else"}"#;
        let request: EvaluationRequest = serde_json::from_str(line).unwrap();
        assert_eq!(request.event_type, EventType::Unknown);
    }

    #[test]
    fn non_object_line_fails_to_parse() {
        assert!(serde_json::from_str::<EvaluationRequest>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<EvaluationRequest>("not json").is_err());
    }

    #[test]
    fn context_copies_interaction_fields() {
        let request: EvaluationRequest = serde_json::from_str(
            r#"{"event_id":"e9","interaction":{"user_query":"q","context":"c","answer":"a"}}"#,
        )
        .unwrap();

        let ctx = EvaluationContext::from_request(&request);
        assert_eq!(ctx.request_id, "e9");
        assert_eq!(ctx.query, "q");
        assert_eq!(ctx.context, "c");
        assert_eq!(ctx.answer, "a");
    }

    #[test]
    fn result_serializes_with_wire_field_names() {
        let result = EvaluationResult {
            id: "evt-1".to_string(),
            stages: vec![StageResult::new(
                "overlap-checker",
                0.75,
                "Sufficient keyword overlap",
                Duration::from_nanos(1200),
            )],
            confidence: 0.82,
            verdict: Verdict::Pass,
        };

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verdict"], "pass");
        assert_eq!(json["stages"][0]["duration_ns"], 1200);
        assert_eq!(json["stages"][0]["name"], "overlap-checker");
        assert_eq!(json["confidence"], 0.82);
    }

    #[test]
    fn verdict_round_trips_through_serde() {
        for verdict in [
            Verdict::Pass,
            Verdict::Review,
            Verdict::Fail,
            Verdict::Unevaluated,
        ] {
            let json = serde_json::to_string(&verdict).unwrap();
            assert_eq!(json, format!("\"{}\"", verdict.as_str()));
            let back: Verdict = serde_json::from_str(&json).unwrap();
            assert_eq!(back, verdict);
        }
    }
}
