use std::fmt;

use crate::normalize::number_jobs;
use crate::view_model::{AppViewModel, JobRowView};
use crate::{
    detect_platform, is_valid_url, normalize, JobId, JobRegistry, NormalizedInput, MAX_URLS,
};

/// Identifies one submission; events tagged with an older id are stale.
pub type BatchId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Drained,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Drained => "Drained",
        };
        f.write_str(label)
    }
}

/// Validation collaborator used on every input change and submission.
pub type UrlValidator = fn(&str) -> bool;

#[derive(Debug, Clone)]
pub struct AppState {
    input: String,
    normalized: NormalizedInput,
    validator: UrlValidator,
    session: SessionState,
    batch_id: BatchId,
    registry: JobRegistry,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_validator(is_valid_url)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: UrlValidator) -> Self {
        Self {
            input: String::new(),
            normalized: NormalizedInput::default(),
            validator,
            session: SessionState::Idle,
            batch_id: 0,
            registry: JobRegistry::default(),
            dirty: false,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Id of the current (or last) batch; 0 before the first submission.
    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn normalized_input(&self) -> &NormalizedInput {
        &self.normalized
    }

    pub fn view(&self) -> AppViewModel {
        let jobs = self
            .registry
            .jobs()
            .iter()
            .map(|job| JobRowView {
                job_id: job.id(),
                url: job.url().to_owned(),
                platform: detect_platform(job.url()).map(|p| p.name()),
                status: job.status().kind(),
                predicted_price: job.outcome().map(|o| o.predicted_price),
                error: job.error().map(ToOwned::to_owned),
            })
            .collect();

        AppViewModel {
            session: self.session,
            detected_urls: self.normalized.detected(),
            max_urls: MAX_URLS,
            over_cap: self.normalized.exceeds_cap(),
            can_submit: self.session != SessionState::Running && !self.normalized.urls.is_empty(),
            progress: self.registry.progress(),
            jobs,
            dirty: self.dirty,
        }
    }

    /// Returns whether a re-render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        self.normalized = normalize(&text, self.validator);
        self.input = text;
        self.mark_dirty();
    }

    /// Replaces any previous batch with a fresh all-pending one.
    pub(crate) fn start_batch(&mut self) -> (BatchId, Vec<(JobId, String)>) {
        let jobs = number_jobs(self.normalized.urls.clone());
        self.batch_id += 1;
        self.registry = JobRegistry::new(&jobs);
        self.session = SessionState::Running;
        self.mark_dirty();
        (self.batch_id, jobs)
    }

    pub(crate) fn registry_mut(&mut self) -> &mut JobRegistry {
        &mut self.registry
    }

    pub(crate) fn finish_batch(&mut self) {
        self.session = SessionState::Drained;
        self.mark_dirty();
    }

    pub(crate) fn reset(&mut self) {
        self.session = SessionState::Idle;
        self.registry = JobRegistry::default();
        self.mark_dirty();
    }
}
