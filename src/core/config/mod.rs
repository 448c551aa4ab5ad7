pub mod loader;

pub use loader::ConfigLoader;

use crate::core::launcher::{LaunchOptions, DEFAULT_INTERPRETER};
use crate::core::paths::ProcessorLocation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Launcher configuration loaded from launcher.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    /// External processor configuration
    #[serde(default)]
    pub processor: ProcessorConfig,
}

/// External processor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Processor entry point; unset means the sibling `fichero_cli` checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Program that runs the processor; `None` executes the processor directly
    #[serde(
        default = "default_interpreter",
        skip_serializing_if = "Option::is_none"
    )]
    pub interpreter: Option<PathBuf>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            path: None,
            interpreter: default_interpreter(),
        }
    }
}

fn default_interpreter() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_INTERPRETER))
}

impl LauncherConfig {
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            processor: match &self.processor.path {
                Some(path) => ProcessorLocation::Explicit(path.clone()),
                None => ProcessorLocation::Sibling,
            },
            interpreter: self.processor.interpreter.clone(),
        }
    }
}
