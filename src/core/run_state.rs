use crate::core::error::TransitionError;
use chrono::Utc;
use fichero_types::{RunSnapshot, RunState};
use tokio::sync::watch;
use uuid::Uuid;

/// Owner of the run lifecycle.
///
/// Every change is published as a whole [`RunSnapshot`] so an observer never sees a
/// new state paired with a stale message.
#[derive(Debug)]
pub struct RunStateMachine {
    sender: watch::Sender<RunSnapshot>,
}

impl RunStateMachine {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(RunSnapshot::default());
        RunStateMachine { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.sender.borrow().clone()
    }

    pub fn state(&self) -> RunState {
        self.sender.borrow().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.sender.borrow().state.is_running()
    }

    /// Replace the status text while no run is active, e.g. after loading a catalog.
    pub fn announce(&self, message: impl Into<String>) -> Result<(), TransitionError> {
        let message = message.into();
        let mut result = Ok(());
        self.sender.send_modify(|snapshot| {
            if snapshot.state.is_running() {
                result = Err(TransitionError::AlreadyRunning);
            } else {
                snapshot.status_message = message;
            }
        });
        result
    }

    /// Drop any finished run and return to Idle.
    pub fn reset(&self, message: impl Into<String>) -> Result<(), TransitionError> {
        let message = message.into();
        let mut result = Ok(());
        self.sender.send_modify(|snapshot| {
            if snapshot.state.is_running() {
                result = Err(TransitionError::AlreadyRunning);
            } else {
                *snapshot = RunSnapshot::idle(message);
            }
        });
        result
    }

    /// Idle, Done or Failed -> Running.
    pub fn begin(&self, run_id: Uuid, workflow: &str) -> Result<(), TransitionError> {
        let mut result = Ok(());
        self.sender.send_modify(|snapshot| {
            if snapshot.state.is_running() {
                result = Err(TransitionError::AlreadyRunning);
                return;
            }
            *snapshot = RunSnapshot {
                state: RunState::Running,
                status_message: format!("Running workflow: {}", workflow),
                run_id: Some(run_id),
                workflow: Some(workflow.to_string()),
                started_at: Some(Utc::now()),
                finished_at: None,
                exit_code: None,
            };
        });
        result
    }

    /// Process creation failed, so Running is never published for this attempt.
    pub fn launch_failed(
        &self,
        run_id: Uuid,
        workflow: &str,
        reason: &str,
    ) -> Result<(), TransitionError> {
        let mut result = Ok(());
        self.sender.send_modify(|snapshot| {
            if snapshot.state.is_running() {
                result = Err(TransitionError::AlreadyRunning);
                return;
            }
            let now = Utc::now();
            *snapshot = RunSnapshot {
                state: RunState::Failed(reason.to_string()),
                status_message: format!("Failed to launch CLI: {}", reason),
                run_id: Some(run_id),
                workflow: Some(workflow.to_string()),
                started_at: Some(now),
                finished_at: Some(now),
                exit_code: None,
            };
        });
        result
    }

    /// Running -> Done.
    pub fn complete(&self, exit_code: Option<i32>) -> Result<(), TransitionError> {
        self.finish(RunState::Done, "Done!".to_string(), exit_code)
    }

    /// Running -> Failed(reason).
    pub fn fail(
        &self,
        reason: impl Into<String>,
        status_message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Result<(), TransitionError> {
        self.finish(
            RunState::Failed(reason.into()),
            status_message.into(),
            exit_code,
        )
    }

    fn finish(
        &self,
        state: RunState,
        status_message: String,
        exit_code: Option<i32>,
    ) -> Result<(), TransitionError> {
        let mut result = Ok(());
        self.sender.send_modify(|snapshot| {
            if !snapshot.state.is_running() {
                result = Err(TransitionError::NotRunning);
                return;
            }
            snapshot.state = state;
            snapshot.status_message = status_message;
            snapshot.finished_at = Some(Utc::now());
            snapshot.exit_code = exit_code;
        });
        result
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
