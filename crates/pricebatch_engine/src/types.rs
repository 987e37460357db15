use std::fmt;

use pricebatch_core::{BatchId, JobId, Msg, PredictionOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A job was admitted and its remote call launched.
    JobStarted { batch_id: BatchId, job_id: JobId },
    /// The remote call for a job settled. Sent before the job's slot is released.
    JobFinished {
        batch_id: BatchId,
        job_id: JobId,
        result: Result<PredictionOutcome, PredictError>,
    },
    /// Every launched job of the batch has settled.
    BatchDrained { batch_id: BatchId },
}

impl EngineEvent {
    /// The state machine message for this event; drain is detected by the state itself.
    pub fn into_msg(self) -> Option<Msg> {
        match self {
            EngineEvent::JobStarted { batch_id, job_id } => {
                Some(Msg::JobStarted { batch_id, job_id })
            }
            EngineEvent::JobFinished {
                batch_id,
                job_id,
                result: Ok(outcome),
            } => Some(Msg::JobSucceeded {
                batch_id,
                job_id,
                outcome,
            }),
            EngineEvent::JobFinished {
                batch_id,
                job_id,
                result: Err(err),
            } => Some(Msg::JobFailed {
                batch_id,
                job_id,
                message: err.message,
            }),
            EngineEvent::BatchDrained { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictError {
    pub kind: FailureKind,
    pub message: String,
}

impl PredictError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PredictError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Unreachable,
    NotFound,
    Timeout,
    RateLimited,
    BadRequest,
    HttpStatus(u16),
    Network,
    Backend,
    InvalidResponse,
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Unreachable => write!(f, "backend unreachable"),
            FailureKind::NotFound => write!(f, "listing not found"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RateLimited => write!(f, "rate limited"),
            FailureKind::BadRequest => write!(f, "bad request"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Backend => write!(f, "backend error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Panicked => write!(f, "prediction task panicked"),
        }
    }
}
