use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use batch_logging::batch_info;
use pricebatch_core::{BatchId, JobId};

use crate::dispatch::{run_batch, ChannelEventSink, DispatchSettings, EventSink};
use crate::{EngineEvent, PredictError, PredictSettings, Predictor, ReqwestPredictor};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build prediction client: {0}")]
    Client(#[from] PredictError),
    #[error("engine stopped unexpectedly")]
    Disconnected,
}

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub predict: PredictSettings,
    pub dispatch: DispatchSettings,
}

enum EngineCommand {
    Submit {
        batch_id: BatchId,
        jobs: Vec<(JobId, String)>,
    },
}

/// Runs batches on a background runtime; results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let predictor = Arc::new(ReqwestPredictor::new(settings.predict)?);
        Self::with_predictor(predictor, settings.dispatch)
    }

    pub fn with_predictor(
        predictor: Arc<dyn Predictor>,
        dispatch: DispatchSettings,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit { batch_id, jobs } => {
                        batch_info!("engine accepted batch {}", batch_id);
                        runtime.spawn(run_batch(
                            batch_id,
                            jobs,
                            dispatch,
                            predictor.clone(),
                            sink.clone(),
                        ));
                    }
                }
            }
            // Handle dropped: in-flight batches get a short grace period.
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, batch_id: BatchId, jobs: Vec<(JobId, String)>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { batch_id, jobs });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks for at most `timeout` waiting for the next event.
    ///
    /// `Ok(None)` means the wait timed out; an error means the engine thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recv_reports_a_stopped_engine() {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let handle = EngineHandle { cmd_tx, event_rx };

        event_tx
            .send(EngineEvent::BatchDrained { batch_id: 1 })
            .unwrap();
        assert!(matches!(
            handle.recv_timeout(Duration::from_millis(10)),
            Ok(Some(EngineEvent::BatchDrained { batch_id: 1 }))
        ));
        assert!(matches!(
            handle.recv_timeout(Duration::from_millis(10)),
            Ok(None)
        ));

        drop(event_tx);
        assert!(matches!(
            handle.recv_timeout(Duration::from_millis(10)),
            Err(EngineError::Disconnected)
        ));
    }
}
