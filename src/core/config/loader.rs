#![allow(clippy::result_large_err)]

use super::LauncherConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub const PROCESSOR_ENV: &str = "FICHERO_PROCESSOR";
pub const INTERPRETER_ENV: &str = "FICHERO_INTERPRETER";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the launcher config.
    ///
    /// An explicit path must exist; otherwise the per-user file is used when present.
    /// Environment variables override file values either way.
    pub fn load(explicit: Option<&Path>) -> Result<LauncherConfig, AppError> {
        let config_file = match explicit {
            Some(path) => Some(Self::load_from_file(path)?.ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("Config file {} does not exist", path.display()),
                )
                .with_code("CLI-001")
            })?),
            None => match Self::default_config_path() {
                Some(path) => Self::load_from_file(&path)?,
                None => None,
            },
        };

        let mut config = config_file.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// `<config_dir>/fichero/launcher.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("fichero").join("launcher.toml"))
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<LauncherConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let mut config: LauncherConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        // `interpreter = ""` runs the processor directly.
        if config
            .processor
            .interpreter
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            config.processor.interpreter = None;
        }

        tracing::debug!(config = %path.display(), "loaded launcher config");
        Ok(Some(config))
    }

    /// An empty value clears the setting: the sibling processor, or no interpreter.
    fn apply_env_overrides(config: &mut LauncherConfig) {
        if let Ok(processor) = env::var(PROCESSOR_ENV) {
            config.processor.path = non_empty(processor);
        }

        if let Ok(interpreter) = env::var(INTERPRETER_ENV) {
            config.processor.interpreter = non_empty(interpreter);
        }
    }

    pub fn validate_config(config: &LauncherConfig) -> Result<(), AppError> {
        let empty_path = config
            .processor
            .path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty());
        if empty_path {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "processor.path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_empty(value: String) -> Option<PathBuf> {
    if value.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
