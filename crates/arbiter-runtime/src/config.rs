//! Runtime configuration.
//!
//! One value object built at startup (CLI flags plus an optional config
//! file) and threaded through constructors. Library code never reads
//! configuration from the environment or from globals.

use arbiter_core::Weights;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a batch evaluation run.
///
/// Every field has a serde default, so a config file only needs to name
/// the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Size of the evaluation worker pool.
    pub workers: usize,

    /// Mean stage score below which judges are skipped entirely.
    pub early_exit_threshold: f64,

    /// Aggregation weight for the mean stage-check score.
    pub stage_weight: f64,

    /// Aggregation weight for the mean judge score.
    pub judge_weight: f64,

    /// Minimum keyword-overlap fraction before the overlap checker
    /// reports a low-overlap reason.
    pub min_overlap: f64,

    /// LLM judge settings.
    pub judge: JudgeConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            early_exit_threshold: 0.3,
            stage_weight: 0.4,
            judge_weight: 0.6,
            min_overlap: 0.1,
            judge: JudgeConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Aggregation weights in the shape the core aggregator consumes.
    pub fn weights(&self) -> Weights {
        Weights {
            stage: self.stage_weight,
            judge: self.judge_weight,
        }
    }
}

/// Settings shared by all judge variants.
///
/// Decoding parameters (temperature, token budget) are fixed by the judge
/// contract and are deliberately not configurable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Model identifier passed to the provider.
    pub model: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            timeout_secs: 15,
        }
    }
}

impl JudgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
