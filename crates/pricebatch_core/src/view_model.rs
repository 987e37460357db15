use crate::{JobId, Progress, SessionState, StatusKind};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    /// Valid distinct URLs in the input box, before the cap.
    pub detected_urls: usize,
    pub max_urls: usize,
    pub over_cap: bool,
    pub can_submit: bool,
    pub progress: Progress,
    pub jobs: Vec<JobRowView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub url: String,
    pub platform: Option<&'static str>,
    pub status: StatusKind,
    pub predicted_price: Option<f64>,
    pub error: Option<String>,
}
