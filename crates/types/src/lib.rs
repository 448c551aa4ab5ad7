//! Shared value types for the fichero launcher.
//!
//! These types cross the boundary between the launcher core and whatever
//! presents it (the CLI today), so they stay plain data with serde support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Lifecycle of a single workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Done,
    Failed(String),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    /// Done and Failed are terminal; Idle is not, since no run exists yet.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            RunState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Done => write!(f, "done"),
            RunState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Everything an observer sees at one instant. State and message are published together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub state: RunState,
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl RunSnapshot {
    pub fn idle(status_message: impl Into<String>) -> Self {
        RunSnapshot {
            state: RunState::Idle,
            status_message: status_message.into(),
            run_id: None,
            workflow: None,
            started_at: None,
            finished_at: None,
            exit_code: None,
        }
    }
}

impl Default for RunSnapshot {
    fn default() -> Self {
        RunSnapshot::idle("Ready")
    }
}

/// Files a run reads or writes, all derived from the project folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunPaths {
    pub processor_path: PathBuf,
    pub config_path: PathBuf,
    pub log_path: PathBuf,
    pub manifest_path: PathBuf,
}
