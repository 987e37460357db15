use crate::{BatchId, JobId, PredictionOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// User asked for the current input to be processed.
    Submitted,
    /// Dispatcher admitted a job.
    JobStarted { batch_id: BatchId, job_id: JobId },
    /// Remote call for a job resolved.
    JobSucceeded {
        batch_id: BatchId,
        job_id: JobId,
        outcome: PredictionOutcome,
    },
    /// Remote call for a job failed; `message` is shown next to the job.
    JobFailed {
        batch_id: BatchId,
        job_id: JobId,
        message: String,
    },
    /// User clicked Retry on a failed job.
    RetryClicked { job_id: JobId },
    /// Discard the current batch (new run or teardown).
    Reset,
    /// Render tick.
    Tick,
    NoOp,
}
