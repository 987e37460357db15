use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{mpsc, Arc};

use batch_logging::{batch_debug, batch_error, batch_info};
use futures_util::FutureExt;
use pricebatch_core::{BatchId, JobId, PredictionOutcome, CONCURRENT_LIMIT};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{EngineEvent, FailureKind, PredictError, Predictor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Maximum number of remote calls in flight. Values below 1 are treated as 1.
    pub concurrency_limit: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: CONCURRENT_LIMIT,
        }
    }
}

/// Receives job lifecycle events as the dispatcher produces them.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

pub type JobResult = Result<PredictionOutcome, PredictError>;

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub batch_id: BatchId,
    /// One entry per job, ordered by job id.
    pub outcomes: Vec<(JobId, JobResult)>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs every job through `predictor` with at most `concurrency_limit` calls in flight.
///
/// Jobs are admitted in the order given. For each job the sink sees
/// `JobStarted` and then exactly one `JobFinished`; a slot is only handed to
/// the next job after the previous holder's `JobFinished` has been emitted.
/// Failures and panics in a call are recorded against that job alone, and
/// `BatchDrained` is emitted once every launched job has settled.
pub async fn run_batch(
    batch_id: BatchId,
    jobs: Vec<(JobId, String)>,
    settings: DispatchSettings,
    predictor: Arc<dyn Predictor>,
    sink: Arc<dyn EventSink>,
) -> BatchReport {
    let limit = settings.concurrency_limit.max(1);
    let slots = Arc::new(Semaphore::new(limit));
    let mut tasks = JoinSet::new();
    let mut launched = Vec::with_capacity(jobs.len());

    batch_info!(
        "batch {} dispatching {} jobs, limit {}",
        batch_id,
        jobs.len(),
        limit
    );

    for (job_id, url) in jobs {
        let permit = slots.clone().acquire_owned().await;

        sink.emit(EngineEvent::JobStarted { batch_id, job_id });
        batch_debug!("batch {} job {} started: {}", batch_id, job_id, url);
        launched.push(job_id);

        let Ok(permit) = permit else {
            // Settled below as an unreported job.
            batch_error!("batch {} job {}: dispatch slots closed", batch_id, job_id);
            continue;
        };

        let predictor = predictor.clone();
        let sink = sink.clone();
        tasks.spawn(async move {
            let result = AssertUnwindSafe(predictor.predict(&url))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(PredictError::new(
                        FailureKind::Panicked,
                        panic_message(panic.as_ref()),
                    ))
                });
            if let Err(err) = &result {
                batch_debug!("batch {} job {} failed: {}", batch_id, job_id, err);
            }
            sink.emit(EngineEvent::JobFinished {
                batch_id,
                job_id,
                result: result.clone(),
            });
            drop(permit);
            (job_id, result)
        });
    }

    let mut outcomes = Vec::with_capacity(launched.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => batch_error!("batch {} task failed to join: {}", batch_id, err),
        }
    }

    // A task that never reported still owes its job a terminal state.
    let settled: HashSet<JobId> = outcomes.iter().map(|(job_id, _)| *job_id).collect();
    for job_id in launched.into_iter().filter(|id| !settled.contains(id)) {
        let result: JobResult = Err(PredictError::new(
            FailureKind::Panicked,
            "Failed to process",
        ));
        sink.emit(EngineEvent::JobFinished {
            batch_id,
            job_id,
            result: result.clone(),
        });
        outcomes.push((job_id, result));
    }
    outcomes.sort_by_key(|(job_id, _)| *job_id);

    let report = BatchReport { batch_id, outcomes };
    batch_info!(
        "batch {} drained: {} succeeded, {} failed",
        batch_id,
        report.succeeded(),
        report.failed()
    );
    sink.emit(EngineEvent::BatchDrained { batch_id });
    report
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "Failed to process".to_string()
    }
}
