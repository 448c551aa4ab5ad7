pub mod cli;
pub mod core;
pub mod logging;

pub use fichero_types::{RunPaths, RunSnapshot, RunState};

/// Current crate version string exposed for CLI and tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Result<T> = std::result::Result<T, anyhow::Error>;
