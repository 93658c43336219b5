//! Bounded concurrent worker pool over a shared job queue.

use arbiter_core::{EvaluationContext, EvaluationResult};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use super::{CancelToken, InputRecord};
use crate::executor::Executor;

/// Pulls input records from a shared queue and multiplexes evaluations
/// across a fixed-size pool of identical workers.
///
/// Channel sizing is bounded mode: both the job queue and the result
/// stream are sized to the full batch, so populating the queue never
/// blocks and workers never block on a slow consumer. The result stream
/// closes only after every worker has drained the queue and returned —
/// each worker holds a sender clone, and the channel closes when the
/// last one is dropped.
pub struct Processor {
    executor: Arc<Executor>,
    workers: usize,
}

impl Processor {
    pub fn new(executor: Arc<Executor>, workers: usize) -> Self {
        Self {
            executor,
            workers: workers.max(1),
        }
    }

    /// Start the pool and return the result stream immediately.
    ///
    /// Results arrive in completion order, unrelated to input order.
    /// Records carrying a parse error are logged and skipped — they are
    /// never forwarded to the executor and never produce a result.
    pub fn process(
        &self,
        records: Vec<InputRecord>,
        cancel: CancelToken,
    ) -> mpsc::Receiver<EvaluationResult> {
        let capacity = records.len().max(1);
        let (job_tx, job_rx) = mpsc::channel::<InputRecord>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<EvaluationResult>(capacity);
        let job_rx = Arc::new(Mutex::new(job_rx));

        tracing::info!(
            workers = self.workers,
            total_records = records.len(),
            "starting worker pool"
        );

        for worker_id in 0..self.workers {
            let executor = Arc::clone(&self.executor);
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(worker_loop(worker_id, executor, jobs, results, cancel));
        }
        // Workers hold the only remaining senders; the result stream
        // closes when the last worker returns.
        drop(result_tx);

        // The queue is sized to the batch, so this never blocks and the
        // caller gets the receiver back immediately.
        for record in records {
            if job_tx.try_send(record).is_err() {
                break;
            }
        }
        drop(job_tx);

        result_rx
    }
}

async fn worker_loop(
    worker_id: usize,
    executor: Arc<Executor>,
    jobs: Arc<Mutex<mpsc::Receiver<InputRecord>>>,
    results: mpsc::Sender<EvaluationResult>,
    cancel: CancelToken,
) {
    loop {
        if cancel.is_cancelled() {
            tracing::info!(worker = worker_id, "cancellation observed, stopping intake");
            break;
        }

        // Hold the queue lock only for the dequeue, never across an
        // evaluation.
        let record = { jobs.lock().await.recv().await };
        let Some(record) = record else {
            break;
        };

        let (line_number, request) = match record {
            InputRecord::Malformed { line_number, error } => {
                tracing::warn!(
                    worker = worker_id,
                    line = line_number,
                    error = %error,
                    "skipping record with parse error"
                );
                continue;
            }
            InputRecord::Parsed {
                line_number,
                request,
            } => (line_number, request),
        };

        let ctx = EvaluationContext::from_request(&request);
        tracing::debug!(worker = worker_id, line = line_number, id = %ctx.request_id, "evaluating");

        let result = executor.execute(ctx).await;
        if results.send(result).await.is_err() {
            // Consumer hung up; no point finishing the queue.
            break;
        }
    }

    tracing::debug!(worker = worker_id, "worker finished");
}
