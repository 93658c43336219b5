//! Result writers: line-delimited and aggregate-summary output.

use arbiter_core::{EvaluationResult, Verdict};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

/// Errors from result serialization and output I/O.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("unsupported output format: {0:?} (supported: jsonl, summary)")]
    UnsupportedFormat(String),

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format selection. Parsing an unknown name fails here, before
/// any sink is opened or any byte is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per result, written and flushed immediately.
    Jsonl,
    /// One aggregate JSON object, emitted when the writer is closed.
    Summary,
}

impl FromStr for OutputFormat {
    type Err = WriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(WriteError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Summary => "summary",
        })
    }
}

/// Serializes evaluation results to an output sink.
pub trait ResultWriter: Send {
    fn write(&mut self, result: &EvaluationResult) -> Result<(), WriteError>;

    /// Flush buffered state. Must be called exactly once, after the last
    /// `write`.
    fn close(&mut self) -> Result<(), WriteError>;
}

/// Construct the writer for a parsed format.
pub fn writer_for(
    format: OutputFormat,
    output: Box<dyn Write + Send>,
) -> Box<dyn ResultWriter> {
    match format {
        OutputFormat::Jsonl => Box::new(JsonlWriter::new(output)),
        OutputFormat::Summary => Box::new(SummaryWriter::new(output)),
    }
}

/// Writes each result as one JSON line, flushed immediately so partial
/// output survives a crash mid-batch.
pub struct JsonlWriter<W: Write> {
    output: W,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }
}

impl<W: Write + Send> ResultWriter for JsonlWriter<W> {
    fn write(&mut self, result: &EvaluationResult) -> Result<(), WriteError> {
        let line = serde_json::to_string(result)?;
        self.output.write_all(line.as_bytes())?;
        self.output.write_all(b"\n")?;
        self.output.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), WriteError> {
        Ok(())
    }
}

/// Aggregate statistics over a batch of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub review_count: usize,
    pub avg_confidence: f64,
}

impl SummaryStats {
    /// Compute stats over a result set. Zero results yields an average
    /// confidence of 0, never a division fault.
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let mut stats = Self {
            total: results.len(),
            pass_count: 0,
            fail_count: 0,
            review_count: 0,
            avg_confidence: 0.0,
        };

        let mut total_confidence = 0.0;
        for result in results {
            total_confidence += result.confidence;
            match result.verdict {
                Verdict::Pass => stats.pass_count += 1,
                Verdict::Fail => stats.fail_count += 1,
                Verdict::Review => stats.review_count += 1,
                // Sentinel results count toward the total only.
                Verdict::Unevaluated => {}
            }
        }

        if stats.total > 0 {
            stats.avg_confidence = total_confidence / stats.total as f64;
        }

        stats
    }
}

/// Buffers every result and emits one aggregate JSON object on close.
pub struct SummaryWriter<W: Write> {
    output: W,
    results: Vec<EvaluationResult>,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            results: Vec::new(),
        }
    }
}

impl<W: Write + Send> ResultWriter for SummaryWriter<W> {
    fn write(&mut self, result: &EvaluationResult) -> Result<(), WriteError> {
        self.results.push(result.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), WriteError> {
        let stats = SummaryStats::from_results(&self.results);
        let body = serde_json::to_string_pretty(&stats)?;
        self.output.write_all(body.as_bytes())?;
        self.output.write_all(b"\n")?;
        self.output.flush()?;
        Ok(())
    }
}
