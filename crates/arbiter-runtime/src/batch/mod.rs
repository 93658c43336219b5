//! Batch evaluation subsystem: reader, worker pool, writers.
//!
//! The batch flow is read → process → write. The reader turns a
//! line-delimited stream into ordered [`InputRecord`]s without aborting
//! on bad lines; the processor multiplexes evaluations over a bounded
//! worker pool; the writers serialize results as they arrive or as one
//! closing summary.

use arbiter_core::EvaluationRequest;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod processor;
mod reader;
mod writer;

pub use processor::Processor;
pub use reader::read_records;
pub use writer::{writer_for, JsonlWriter, OutputFormat, ResultWriter, SummaryStats, SummaryWriter, WriteError};

/// A line-addressed input record: either a parsed request or the reason
/// the line failed to parse. Exactly one of the two, by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum InputRecord {
    Parsed {
        line_number: usize,
        request: EvaluationRequest,
    },
    Malformed {
        line_number: usize,
        error: String,
    },
}

impl InputRecord {
    pub fn line_number(&self) -> usize {
        match self {
            InputRecord::Parsed { line_number, .. } => *line_number,
            InputRecord::Malformed { line_number, .. } => *line_number,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, InputRecord::Malformed { .. })
    }
}

/// Cooperative cancellation signal threaded through the batch pipeline.
///
/// Cancellation is best-effort: the reader and the worker intake loops
/// check the token once per iteration and stop starting new work, but
/// judge calls already in flight run to completion and their results are
/// still published.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
