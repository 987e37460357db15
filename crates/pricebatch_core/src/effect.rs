use crate::{BatchId, BatchResult, InputError, JobId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start dispatching a freshly created batch.
    RunBatch {
        batch_id: BatchId,
        jobs: Vec<(JobId, String)>,
    },
    /// Emitted once per batch, when its last job settles.
    DeliverResults {
        batch_id: BatchId,
        results: Vec<BatchResult>,
    },
    Notify(Notice),
}

/// User-facing notifications (toasts in a GUI, lines on a terminal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    InputRejected(InputError),
    Completed { succeeded: usize, failed: usize },
    RetryUnavailable { job_id: JobId },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::InputRejected(InputError::NoValidUrls) => "Invalid URLs",
            Notice::InputRejected(InputError::TooManyUrls { .. }) => "Too Many URLs",
            Notice::Completed { .. } => "Processing Complete",
            Notice::RetryUnavailable { .. } => "Retry",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Notice::InputRejected(err) => err.to_string(),
            Notice::Completed { succeeded, .. } => {
                format!("Processed {succeeded} URLs successfully")
            }
            Notice::RetryUnavailable { .. } => "Retry functionality coming soon".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::InputRejected(_))
    }
}
