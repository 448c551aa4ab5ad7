pub mod config;
pub mod error;
pub mod launcher;
pub mod paths;
pub mod project;
pub mod run_state;
pub mod session;
pub mod types;

pub use config::{ConfigLoader, LauncherConfig};
pub use error::{
    AppError, ConfigError, DefaultErrorReporter, ErrorReporter, LaunchError, TransitionError,
};
pub use launcher::{LaunchOptions, RunHandle, RunLauncher, RunRequest};
pub use paths::{derive_paths, ProcessorLocation};
pub use project::{load_workflows, WorkflowCatalog};
pub use run_state::RunStateMachine;
pub use session::LauncherSession;
pub use types::*;
