//! Pricebatch core: URL normalization, the job registry and the pure batch
//! session state machine.
mod effect;
mod job;
mod msg;
mod normalize;
mod outcome;
mod platform;
mod progress;
mod registry;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notice};
pub use job::{Job, JobId, JobStatus, StatusKind, TransitionError};
pub use msg::Msg;
pub use normalize::{
    check_batch_len, is_valid_url, normalize, prepare_batch, InputError, NormalizedInput,
    MAX_URLS,
};
pub use outcome::{BatchResult, CarFeatures, ConfidenceInterval, PredictionOutcome, PriceComparison};
pub use platform::{detect_platform, Platform};
pub use progress::Progress;
pub use registry::JobRegistry;
pub use state::{AppState, BatchId, SessionState, UrlValidator};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView};

/// Maximum number of jobs in `Processing` at once.
pub const CONCURRENT_LIMIT: usize = 3;

/// Interval between progress renders while a batch runs.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);
