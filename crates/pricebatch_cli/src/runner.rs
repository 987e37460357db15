use std::path::PathBuf;

use batch_logging::{batch_info, batch_warn};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use pricebatch_core::{update, AppState, BatchResult, Effect, Msg, SessionState, POLL_INTERVAL};
use pricebatch_engine::{
    export_results, EngineError, EngineHandle, ExportDocument, ExportError,
    DEFAULT_EXPORT_FILENAME,
};

use crate::render;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub export_path: Option<PathBuf>,
}

/// Owns the state machine and executes its effects against the engine.
pub struct BatchRunner {
    engine: EngineHandle,
    state: AppState,
    delivered: Option<Vec<BatchResult>>,
    progress: ProgressBar,
}

impl BatchRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            state: AppState::new(),
            delivered: None,
            progress: ProgressBar::hidden(),
        }
    }

    /// Submits `input`, renders progress until the batch drains and exports the results.
    pub fn run(mut self, input: String, output_dir: Option<PathBuf>) -> Result<RunSummary, RunError> {
        self.dispatch(Msg::InputChanged(input));
        println!("{}", render::input_summary(&self.state.view()));

        if let Some(rejection) = self.dispatch(Msg::Submitted) {
            return Err(RunError::Rejected(rejection));
        }

        let total = self.state.view().progress.total as u64;
        self.progress = ProgressBar::new(total);
        self.progress.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        while self.state.session() == SessionState::Running {
            if let Some(event) = self.engine.recv_timeout(POLL_INTERVAL)? {
                if let Some(msg) = event.into_msg() {
                    self.dispatch(msg);
                }
                // Coalesce whatever else arrived before rendering.
                while let Some(event) = self.engine.try_recv() {
                    if let Some(msg) = event.into_msg() {
                        self.dispatch(msg);
                    }
                }
            }
            self.render_progress();
        }
        self.progress.finish_and_clear();

        let view = self.state.view();
        for row in render::job_rows(&view) {
            println!("{row}");
        }

        let results = self.delivered.take().unwrap_or_default();
        let export_path = match output_dir {
            Some(dir) => {
                let document =
                    ExportDocument::from_registry(self.state.registry(), Utc::now().to_rfc3339());
                Some(export_results(&dir, &document, DEFAULT_EXPORT_FILENAME)?)
            }
            None => None,
        };

        Ok(RunSummary {
            succeeded: results.len(),
            failed: view.progress.failed,
            export_path,
        })
    }

    /// Applies `msg` and runs its effects. Returns the rejection text if the input was refused.
    fn dispatch(&mut self, msg: Msg) -> Option<String> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        let mut rejection = None;
        for effect in effects {
            match effect {
                Effect::RunBatch { batch_id, jobs } => {
                    batch_info!("RunBatch batch_id={} jobs={}", batch_id, jobs.len());
                    self.engine.submit(batch_id, jobs);
                }
                Effect::DeliverResults { batch_id, results } => {
                    batch_info!(
                        "DeliverResults batch_id={} results={}",
                        batch_id,
                        results.len()
                    );
                    self.delivered = Some(results);
                }
                Effect::Notify(notice) => {
                    let line = render::notice_line(&notice);
                    if notice.is_error() {
                        batch_warn!("{}", line);
                        rejection = Some(line);
                    } else {
                        self.progress.suspend(|| println!("{line}"));
                    }
                }
            }
        }
        rejection
    }

    fn render_progress(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        let progress = self.state.view().progress;
        self.progress.set_position(progress.settled() as u64);
        self.progress.set_message(progress.summary());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use pricebatch_core::{CarFeatures, PredictionOutcome};
    use pricebatch_engine::{DispatchSettings, FailureKind, PredictError, Predictor};

    use super::*;

    struct StubPredictor;

    #[async_trait::async_trait]
    impl Predictor for StubPredictor {
        async fn predict(&self, url: &str) -> Result<PredictionOutcome, PredictError> {
            if url.contains("sold") {
                return Err(PredictError::new(FailureKind::NotFound, "Listing no longer available"));
            }
            Ok(PredictionOutcome {
                extracted_data: CarFeatures {
                    make: "Toyota".to_string(),
                    model: "Corolla".to_string(),
                    year: 2019,
                    mileage: 50_000.0,
                    condition: "Good".to_string(),
                    fuel_type: "Gasoline".to_string(),
                    location: "Baghdad".to_string(),
                    engine_size: 1.8,
                    cylinders: 4,
                    trim: None,
                    color: None,
                },
                predicted_price: 12_000.0,
                listing_price: None,
                confidence_interval: None,
                price_comparison: None,
                message: None,
            })
        }
    }

    fn runner() -> BatchRunner {
        let engine =
            EngineHandle::with_predictor(Arc::new(StubPredictor), DispatchSettings::default())
                .unwrap();
        BatchRunner::new(engine)
    }

    #[test]
    fn input_without_valid_urls_is_rejected() {
        let err = runner()
            .run("not a url\n\n   ".to_string(), None)
            .err()
            .expect("rejected");

        match err {
            RunError::Rejected(line) => {
                assert_eq!(line, "Invalid URLs: please enter at least one valid URL")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn run_drains_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let input = "https://a.test/1\nhttps://a.test/sold\nhttps://a.test/1\nhttps://a.test/3";

        let summary = runner()
            .run(input.to_string(), Some(dir.path().to_path_buf()))
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        let path = summary.export_path.expect("export path");
        assert_eq!(path, dir.path().join(DEFAULT_EXPORT_FILENAME));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["total"], 3);
        assert_eq!(written["results"][1]["error"], "Listing no longer available");
    }

    #[test]
    fn export_is_skipped_without_output_dir() {
        let summary = runner()
            .run("https://a.test/1".to_string(), None)
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.export_path, None);
    }
}
