use std::fmt;

use crate::PredictionOutcome;

pub type JobId = u64;

/// Lifecycle of one URL. Terminal payloads only exist in terminal states.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Succeeded(PredictionOutcome),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded(_) | JobStatus::Failed(_))
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            JobStatus::Pending => StatusKind::Pending,
            JobStatus::Processing => StatusKind::Processing,
            JobStatus::Succeeded(_) => StatusKind::Succeeded,
            JobStatus::Failed(_) => StatusKind::Failed,
        }
    }
}

/// Payload-free discriminant of [`JobStatus`], handy for views and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Pending,
    Processing,
    Succeeded,
    Failed,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusKind::Pending => "Pending",
            StatusKind::Processing => "Processing",
            StatusKind::Succeeded => "Success",
            StatusKind::Failed => "Error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("job {job_id} not found")]
    UnknownJob { job_id: JobId },
    #[error("job {job_id} cannot move from {from} to {to}")]
    Illegal {
        job_id: JobId,
        from: StatusKind,
        to: StatusKind,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: JobId,
    url: String,
    status: JobStatus,
}

impl Job {
    pub fn new(id: JobId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            status: JobStatus::Pending,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match &self.status {
            JobStatus::Succeeded(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// `Pending -> Processing`.
    pub fn claim(&mut self) -> Result<(), TransitionError> {
        self.expect(StatusKind::Pending, StatusKind::Processing)?;
        self.status = JobStatus::Processing;
        Ok(())
    }

    /// `Processing -> Succeeded`.
    pub fn succeed(&mut self, outcome: PredictionOutcome) -> Result<(), TransitionError> {
        self.expect(StatusKind::Processing, StatusKind::Succeeded)?;
        self.status = JobStatus::Succeeded(outcome);
        Ok(())
    }

    /// `Processing -> Failed`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.expect(StatusKind::Processing, StatusKind::Failed)?;
        self.status = JobStatus::Failed(message.into());
        Ok(())
    }

    fn expect(&self, from: StatusKind, to: StatusKind) -> Result<(), TransitionError> {
        let current = self.status.kind();
        if current == from {
            Ok(())
        } else {
            Err(TransitionError::Illegal {
                job_id: self.id,
                from: current,
                to,
            })
        }
    }
}
