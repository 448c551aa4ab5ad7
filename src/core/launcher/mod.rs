pub mod spawner;

pub use spawner::{ExitSummary, Invocation, ProcessSpawner, SpawnedProcess, TokioProcessSpawner};

use crate::core::error::LaunchError;
use crate::core::paths::{derive_paths, ProcessorLocation};
use crate::core::run_state::RunStateMachine;
use fichero_types::{RunPaths, RunSnapshot, RunState};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use uuid::Uuid;

pub const RUN_WORKFLOW_COMMAND: &str = "run-workflow";

/// The processor is a plain Python script with no shebang or exec bit.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Everything needed to start one run. Built fresh for every launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunRequest {
    project_folder: PathBuf,
    workflow: String,
    paths: RunPaths,
}

impl RunRequest {
    pub fn new(project_folder: &Path, workflow: &str, processor: &ProcessorLocation) -> Self {
        RunRequest {
            project_folder: project_folder.to_path_buf(),
            workflow: workflow.to_string(),
            paths: derive_paths(project_folder, processor),
        }
    }

    pub fn project_folder(&self) -> &Path {
        &self.project_folder
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    /// `[processor, run-workflow, config, workflow, --log-file, log, --manifest-file, manifest]`
    pub fn argv(&self) -> Vec<OsString> {
        vec![
            self.paths.processor_path.clone().into_os_string(),
            OsString::from(RUN_WORKFLOW_COMMAND),
            self.paths.config_path.clone().into_os_string(),
            OsString::from(&self.workflow),
            OsString::from("--log-file"),
            self.paths.log_path.clone().into_os_string(),
            OsString::from("--manifest-file"),
            self.paths.manifest_path.clone().into_os_string(),
        ]
    }

    /// With an interpreter the whole argv is handed to it; otherwise the processor runs directly.
    pub fn invocation(&self, interpreter: Option<&Path>) -> Invocation {
        let mut argv = self.argv();
        match interpreter {
            Some(interpreter) => Invocation {
                program: interpreter.to_path_buf(),
                args: argv,
            },
            None => {
                let program = PathBuf::from(argv.remove(0));
                Invocation {
                    program,
                    args: argv,
                }
            }
        }
    }
}

/// How the launcher locates and starts the processor.
///
/// `interpreter: None` executes the processor directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchOptions {
    pub processor: ProcessorLocation,
    pub interpreter: Option<PathBuf>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        LaunchOptions {
            processor: ProcessorLocation::Sibling,
            interpreter: Some(PathBuf::from(DEFAULT_INTERPRETER)),
        }
    }
}

/// Observer's view of one run started by [`RunLauncher::start`].
#[derive(Debug)]
pub struct RunHandle {
    run_id: Uuid,
    receiver: watch::Receiver<RunSnapshot>,
    launch_error: Option<LaunchError>,
}

impl RunHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The process creation error, if this run never started. Already reflected in state.
    pub fn take_launch_error(&mut self) -> Option<LaunchError> {
        self.launch_error.take()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.receiver.borrow().clone()
    }

    pub fn state(&self) -> RunState {
        self.receiver.borrow().state.clone()
    }

    pub fn status_message(&self) -> String {
        self.receiver.borrow().status_message.clone()
    }

    /// Wait for the next published change, `None` once the launcher is gone.
    pub async fn next_change(&mut self) -> Option<RunSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Resolve with the terminal snapshot of this run.
    pub async fn wait(&mut self) -> RunSnapshot {
        let run_id = self.run_id;
        let finished = match self
            .receiver
            .wait_for(|snapshot| snapshot.run_id != Some(run_id) || snapshot.state.is_terminal())
            .await
        {
            Ok(snapshot) => Some(snapshot.clone()),
            Err(_) => None,
        };
        finished.unwrap_or_else(|| self.receiver.borrow().clone())
    }
}

/// Starts the external processor and tracks the single active run.
pub struct RunLauncher {
    options: LaunchOptions,
    spawner: Arc<dyn ProcessSpawner>,
    state: Arc<RunStateMachine>,
    cancel: Option<oneshot::Sender<()>>,
}

impl RunLauncher {
    pub fn new(options: LaunchOptions) -> Self {
        Self::with_spawner(options, Arc::new(TokioProcessSpawner))
    }

    pub fn with_spawner(options: LaunchOptions, spawner: Arc<dyn ProcessSpawner>) -> Self {
        RunLauncher {
            options,
            spawner,
            state: Arc::new(RunStateMachine::new()),
            cancel: None,
        }
    }

    pub fn options(&self) -> &LaunchOptions {
        &self.options
    }

    pub fn state(&self) -> &RunStateMachine {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn request_for(&self, project_folder: &Path, workflow: &str) -> RunRequest {
        RunRequest::new(project_folder, workflow, &self.options.processor)
    }

    /// Launch `workflow` for `project_folder`.
    ///
    /// Returns `None` without touching state when either input is missing or a run is
    /// already active. Must be called within a tokio runtime.
    pub fn start(
        &mut self,
        project_folder: Option<&Path>,
        workflow: Option<&str>,
    ) -> Option<RunHandle> {
        let (Some(project_folder), Some(workflow)) = (project_folder, workflow) else {
            tracing::debug!("start ignored: project folder or workflow not selected");
            return None;
        };
        if self.state.is_running() {
            tracing::warn!(workflow, "start ignored: a run is already in progress");
            return None;
        }

        let request = self.request_for(project_folder, workflow);
        let run_id = Uuid::new_v4();
        let mut handle = RunHandle {
            run_id,
            receiver: self.state.subscribe(),
            launch_error: None,
        };

        if let Err(err) = self.launch(&request, run_id) {
            tracing::error!(workflow, error = %err, "failed to launch processor");
            if let Err(transition) = self.state.launch_failed(run_id, workflow, &err.reason()) {
                tracing::warn!(error = %transition, "could not record launch failure");
            }
            handle.launch_error = Some(err);
        }
        Some(handle)
    }

    /// Ask the active run to stop. Returns `false` if nothing was running.
    pub fn cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(sender) if self.state.is_running() => sender.send(()).is_ok(),
            _ => false,
        }
    }

    fn launch(&mut self, request: &RunRequest, run_id: Uuid) -> Result<(), LaunchError> {
        let invocation = request.invocation(self.options.interpreter.as_deref());
        tracing::info!(
            workflow = request.workflow(),
            program = %invocation.program.display(),
            config = %request.paths().config_path.display(),
            "launching workflow"
        );

        let process = self
            .spawner
            .spawn(&invocation)
            .map_err(|source| LaunchError {
                program: invocation.program.clone(),
                source,
            })?;

        if let Err(err) = self.state.begin(run_id, request.workflow()) {
            tracing::warn!(error = %err, "run state refused transition to running");
        }
        tracing::debug!(pid = process.id(), "processor started");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.cancel = Some(cancel_tx);
        tokio::spawn(observe(
            process,
            Arc::clone(&self.state),
            cancel_rx,
            request.workflow().to_string(),
        ));
        Ok(())
    }
}

enum Outcome {
    Exited(std::io::Result<ExitSummary>),
    Cancelled,
}

async fn observe(
    mut process: Box<dyn SpawnedProcess>,
    state: Arc<RunStateMachine>,
    cancel: oneshot::Receiver<()>,
    workflow: String,
) {
    let outcome = tokio::select! {
        status = process.wait() => Outcome::Exited(status),
        Ok(()) = cancel => {
            if let Err(err) = process.kill().await {
                tracing::warn!(workflow = %workflow, error = %err, "failed to kill processor");
            }
            Outcome::Cancelled
        }
    };

    let transition = match outcome {
        Outcome::Exited(Ok(summary)) if summary.success() => {
            tracing::info!(workflow = %workflow, "workflow finished");
            state.complete(summary.code)
        }
        Outcome::Exited(Ok(ExitSummary { code: Some(code) })) => {
            tracing::warn!(workflow = %workflow, code, "workflow exited with failure");
            state.fail(
                format!("exited with status {}", code),
                format!("Workflow {} exited with status {}", workflow, code),
                Some(code),
            )
        }
        Outcome::Exited(Ok(ExitSummary { code: None })) => {
            tracing::warn!(workflow = %workflow, "workflow terminated by signal");
            state.fail(
                "terminated by signal",
                format!("Workflow {} terminated by signal", workflow),
                None,
            )
        }
        Outcome::Exited(Err(err)) => {
            tracing::error!(workflow = %workflow, error = %err, "lost track of processor");
            state.fail(
                err.to_string(),
                format!("Lost track of workflow {}: {}", workflow, err),
                None,
            )
        }
        Outcome::Cancelled => {
            tracing::info!(workflow = %workflow, "workflow cancelled");
            state.fail("cancelled", "Cancelled", None)
        }
    };

    if let Err(err) = transition {
        tracing::warn!(workflow = %workflow, error = %err, "run state refused final transition");
    }
}
