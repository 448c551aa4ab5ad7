use crate::core::project::config_path;
use fichero_types::RunPaths;
use std::env;
use std::path::{Component, Path, PathBuf};

pub const LOG_FILE: &str = "fichero_cli.log";
pub const MANIFEST_FILE: &str = "manifest.jsonl";

/// Location of the processor relative to a project folder when none is configured.
pub const SIBLING_PROCESSOR: &str = "../fichero_cli/fichero_cli.py";

/// Where the external processor lives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcessorLocation {
    /// `<project>/../fichero_cli/fichero_cli.py`
    #[default]
    Sibling,
    /// A configured path; relative paths are taken from the project folder.
    Explicit(PathBuf),
}

impl ProcessorLocation {
    pub fn resolve(&self, project_folder: &Path) -> PathBuf {
        let candidate = match self {
            ProcessorLocation::Sibling => project_folder.join(SIBLING_PROCESSOR),
            ProcessorLocation::Explicit(path) => project_folder.join(path),
        };
        normalize(&absolute(&candidate))
    }
}

/// Compute every path a run needs. Pure path arithmetic; nothing is checked on disk.
pub fn derive_paths(project_folder: &Path, processor: &ProcessorLocation) -> RunPaths {
    RunPaths {
        processor_path: processor.resolve(project_folder),
        config_path: config_path(project_folder),
        log_path: project_folder.join(LOG_FILE),
        manifest_path: project_folder.join(MANIFEST_FILE),
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
