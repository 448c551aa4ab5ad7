#![allow(clippy::result_large_err)]

use crate::core::types::{ErrorCategory, ErrorSeverity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Status text shown for every configuration failure.
pub const WORKFLOWS_NOT_FOUND: &str = "No workflows found in project.yml";

/// Failure to turn `project.yml` into a workflow catalog.
///
/// The variants exist for logs only; users see [`ConfigError::status_message`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("project config {} does not exist", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read project config {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse project config {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("project config {} has no `workflows` mapping", path.display())]
    WorkflowsNotFound { path: PathBuf },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Missing { path }
            | ConfigError::Unreadable { path, .. }
            | ConfigError::Malformed { path, .. }
            | ConfigError::WorkflowsNotFound { path } => path,
        }
    }

    pub fn status_message(&self) -> &'static str {
        WORKFLOWS_NOT_FOUND
    }
}

/// Process creation for the external processor failed.
#[derive(Debug, Error)]
#[error("failed to launch {}: {source}", program.display())]
pub struct LaunchError {
    pub program: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl LaunchError {
    /// OS-level error text, without the program prefix.
    pub fn reason(&self) -> String {
        self.source.to_string()
    }
}

/// A run state change that the state machine refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error("no run is in progress")]
    NotRunning,
}

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub code: String,
    pub message: String,
    pub context: HashMap<String, String>,
    pub recovery_suggestions: Vec<String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let severity = match category {
            ErrorCategory::ConfigError
            | ErrorCategory::LaunchError
            | ErrorCategory::ValidationError
            | ErrorCategory::IoError => ErrorSeverity::Error,
            ErrorCategory::StateError => ErrorSeverity::Warning,
        };
        AppError {
            category,
            severity,
            code: format!("ERR-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: HashMap::new(),
            recovery_suggestions: vec![],
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_suggestion<T: Into<String>>(mut self, suggestion: T) -> Self {
        self.recovery_suggestions.push(suggestion.into());
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (Context: {:?})", self.context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        let mut error = AppError::new(ErrorCategory::ConfigError, e.status_message())
            .with_code("CFG-001")
            .with_suggestion("Add a top-level `workflows` mapping to project.yml");
        error.add_context("config_path", &e.path().display().to_string());
        error.source = Some(anyhow::Error::new(e));
        error
    }
}

impl From<LaunchError> for AppError {
    fn from(e: LaunchError) -> Self {
        let mut error = AppError::new(
            ErrorCategory::LaunchError,
            format!("Failed to launch CLI: {}", e.reason()),
        )
        .with_code("RUN-001")
        .with_suggestion("Check the processor path with `fichero paths` or pass --processor");
        error.add_context("program", &e.program.display().to_string());
        error.source = Some(anyhow::Error::new(e));
        error
    }
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::new(ErrorCategory::StateError, e.to_string())
            .with_code("RUN-002")
            .with_suggestion("Wait for the current workflow to finish or cancel it")
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        let mut error = AppError::new(ErrorCategory::IoError, e.to_string())
            .with_code("IO_ERROR")
            .with_suggestion("Check file permissions and paths");
        error.source = Some(anyhow::anyhow!(e));
        error
    }
}

pub trait ErrorReporter {
    fn report_error(&self, error: &AppError);
    fn report_warning(&self, message: &str, context: Option<String>);
}

pub struct DefaultErrorReporter;

impl DefaultErrorReporter {
    pub fn new() -> Self {
        DefaultErrorReporter
    }
}

impl Default for DefaultErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for DefaultErrorReporter {
    fn report_error(&self, error: &AppError) {
        eprintln!("[ERROR] {}: {}", error.code, error.message);
        if !error.context.is_empty() {
            eprintln!("  Context: {:?}", error.context);
        }
        if let Some(ref source) = error.source {
            eprintln!("  Caused by: {}", source);
        }
        for suggestion in &error.recovery_suggestions {
            eprintln!("  Hint: {}", suggestion);
        }
    }

    fn report_warning(&self, message: &str, context: Option<String>) {
        eprintln!("[WARNING] {}", message);
        if let Some(ref ctx) = context {
            eprintln!("  Context: {}", ctx);
        }
    }
}
