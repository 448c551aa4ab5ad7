#![allow(clippy::result_large_err)]

use crate::core::error::{AppError, ConfigError, TransitionError};
use crate::core::launcher::{LaunchOptions, ProcessSpawner, RunHandle, RunLauncher};
use crate::core::project::{load_workflows, WorkflowCatalog};
use crate::core::types::ErrorCategory;
use fichero_types::RunSnapshot;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

const READY_TO_RUN: &str = "Ready to run";

/// What a front-end holds between user actions: chosen folder, its workflows, the
/// selected workflow and the launcher that runs it.
pub struct LauncherSession {
    project_folder: Option<PathBuf>,
    catalog: WorkflowCatalog,
    selected: Option<String>,
    launcher: RunLauncher,
}

impl LauncherSession {
    pub fn new(options: LaunchOptions) -> Self {
        Self::with_launcher(RunLauncher::new(options))
    }

    pub fn with_spawner(options: LaunchOptions, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self::with_launcher(RunLauncher::with_spawner(options, spawner))
    }

    fn with_launcher(launcher: RunLauncher) -> Self {
        LauncherSession {
            project_folder: None,
            catalog: WorkflowCatalog::default(),
            selected: None,
            launcher,
        }
    }

    pub fn project_folder(&self) -> Option<&Path> {
        self.project_folder.as_deref()
    }

    pub fn catalog(&self) -> &WorkflowCatalog {
        &self.catalog
    }

    pub fn selected_workflow(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn launcher(&self) -> &RunLauncher {
        &self.launcher
    }

    /// Switch to `folder` and load its workflows.
    ///
    /// The previous catalog and selection are discarded first. On success the first
    /// workflow in sorted order is selected. Refused while a run is active.
    pub fn select_folder(&mut self, folder: impl Into<PathBuf>) -> Result<&WorkflowCatalog, AppError> {
        if self.launcher.is_running() {
            let mut err = AppError::from(TransitionError::AlreadyRunning);
            err.add_context("action", "change project folder");
            return Err(err);
        }

        let folder = folder.into();
        self.catalog = WorkflowCatalog::default();
        self.selected = None;
        tracing::info!(project = %folder.display(), "project folder selected");

        let loaded = load_workflows(&folder);
        self.project_folder = Some(folder);
        match loaded {
            Ok(catalog) => {
                self.selected = catalog.sorted_names().into_iter().next();
                self.catalog = catalog;
                let status = if self.catalog.is_empty() {
                    crate::core::error::WORKFLOWS_NOT_FOUND
                } else {
                    READY_TO_RUN
                };
                self.announce(status);
                Ok(&self.catalog)
            }
            Err(err) => {
                self.report_config_error(&err);
                Err(err.into())
            }
        }
    }

    /// Select a workflow by name; only names from the loaded catalog are accepted.
    pub fn select_workflow(&mut self, name: &str) -> Result<(), AppError> {
        if !self.catalog.contains(name) {
            let mut err = AppError::new(
                ErrorCategory::ValidationError,
                format!("Unknown workflow '{}'", name),
            )
            .with_code("CFG-002");
            err.add_context("available", &self.catalog.sorted_names().join(", "));
            return Err(err);
        }
        self.selected = Some(name.to_string());
        Ok(())
    }

    /// See [`RunLauncher::start`]; uses the current folder and selection.
    pub fn start(&mut self) -> Option<RunHandle> {
        self.launcher
            .start(self.project_folder.as_deref(), self.selected.as_deref())
    }

    pub fn cancel(&mut self) -> bool {
        self.launcher.cancel()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.launcher.subscribe()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.launcher.state().snapshot()
    }

    pub fn status_message(&self) -> String {
        self.snapshot().status_message
    }

    fn report_config_error(&self, err: &ConfigError) {
        tracing::warn!(error = %err, "failed to load workflows");
        self.announce(err.status_message());
    }

    fn announce(&self, message: &str) {
        if let Err(err) = self.launcher.state().reset(message) {
            tracing::warn!(error = %err, "status update refused");
        }
    }
}
