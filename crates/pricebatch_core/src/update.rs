use batch_logging::{batch_debug, batch_info, batch_warn};

use crate::{
    check_batch_len, AppState, BatchId, Effect, JobStatus, Msg, Notice, SessionState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            // Input is frozen while a batch runs.
            if state.session() != SessionState::Running {
                state.set_input(text);
            }
            Vec::new()
        }
        Msg::Submitted => {
            if state.session() == SessionState::Running {
                return (state, Vec::new());
            }
            if let Err(err) = check_batch_len(state.normalized_input().urls.len()) {
                batch_info!("submission rejected: {}", err);
                state.mark_dirty();
                return (state, vec![Effect::Notify(Notice::InputRejected(err))]);
            }
            let (batch_id, jobs) = state.start_batch();
            batch_info!("batch {} started with {} jobs", batch_id, jobs.len());
            vec![Effect::RunBatch { batch_id, jobs }]
        }
        Msg::JobStarted { batch_id, job_id } => {
            if is_current(&state, batch_id) {
                if let Err(err) = state.registry_mut().claim(job_id) {
                    batch_warn!("batch {}: {}", batch_id, err);
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::JobSucceeded {
            batch_id,
            job_id,
            outcome,
        } => {
            if !is_current(&state, batch_id) {
                return (state, Vec::new());
            }
            if let Err(err) = state.registry_mut().succeed(job_id, outcome) {
                batch_warn!("batch {}: {}", batch_id, err);
            }
            state.mark_dirty();
            drain_if_settled(&mut state)
        }
        Msg::JobFailed {
            batch_id,
            job_id,
            message,
        } => {
            if !is_current(&state, batch_id) {
                return (state, Vec::new());
            }
            if let Err(err) = state.registry_mut().fail(job_id, message) {
                batch_warn!("batch {}: {}", batch_id, err);
            }
            state.mark_dirty();
            drain_if_settled(&mut state)
        }
        Msg::RetryClicked { job_id } => match state.registry().get(job_id).map(|j| j.status()) {
            Some(JobStatus::Failed(_)) => vec![Effect::Notify(Notice::RetryUnavailable { job_id })],
            _ => Vec::new(),
        },
        Msg::Reset => {
            if state.session() != SessionState::Idle {
                batch_info!("batch {} discarded", state.batch_id());
                state.reset();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn is_current(state: &AppState, batch_id: BatchId) -> bool {
    let current = state.session() == SessionState::Running && state.batch_id() == batch_id;
    if !current {
        batch_debug!(
            "ignoring event for batch {} (current {}, {})",
            batch_id,
            state.batch_id(),
            state.session()
        );
    }
    current
}

/// Fires the completion effects the first time the registry drains.
fn drain_if_settled(state: &mut AppState) -> Vec<Effect> {
    if !state.registry().is_drained() {
        return Vec::new();
    }
    state.finish_batch();
    let progress = state.registry().progress();
    let results = state.registry().collect_results();
    batch_info!(
        "batch {} drained: {} succeeded, {} failed",
        state.batch_id(),
        progress.succeeded,
        progress.failed
    );
    vec![
        Effect::DeliverResults {
            batch_id: state.batch_id(),
            results,
        },
        Effect::Notify(Notice::Completed {
            succeeded: progress.succeeded,
            failed: progress.failed,
        }),
    ]
}
