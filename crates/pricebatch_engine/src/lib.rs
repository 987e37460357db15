//! Pricebatch engine: the remote prediction client, the bounded dispatcher
//! and result export.
mod dispatch;
mod engine;
mod export;
mod persist;
mod predict;
mod types;

pub use dispatch::{
    run_batch, BatchReport, ChannelEventSink, DispatchSettings, EventSink, JobResult,
};
pub use engine::{EngineError, EngineHandle, EngineSettings};
pub use export::{export_results, ExportDocument, ExportError, ExportRow, DEFAULT_EXPORT_FILENAME};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use predict::{PredictSettings, Predictor, ReqwestPredictor, PREDICT_FROM_URL_PATH};
pub use types::{EngineEvent, FailureKind, PredictError};
