#![allow(clippy::result_large_err)]

use crate::core::error::ConfigError;
use indexmap::IndexMap;
use serde_yaml::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the project configuration inside a project folder.
pub const PROJECT_CONFIG_FILE: &str = "project.yml";

const WORKFLOWS_KEY: &str = "workflows";

/// Workflows declared in a project's `project.yml`, keyed by name.
///
/// Definitions are kept as raw YAML; the launcher only ever needs the names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowCatalog {
    workflows: IndexMap<String, Value>,
}

impl WorkflowCatalog {
    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workflows.contains_key(name)
    }

    /// Names in no guaranteed order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.workflows.keys().map(String::as_str)
    }

    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workflows.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn definition(&self, name: &str) -> Option<&Value> {
        self.workflows.get(name)
    }

    /// Step names of a workflow whose definition is a plain list of strings.
    pub fn steps(&self, name: &str) -> Option<Vec<String>> {
        let sequence = self.workflows.get(name)?.as_sequence()?;
        sequence
            .iter()
            .map(|step| step.as_str().map(str::to_string))
            .collect()
    }
}

/// Path of the configuration file for `project_folder`.
pub fn config_path(project_folder: &Path) -> PathBuf {
    project_folder.join(PROJECT_CONFIG_FILE)
}

/// Read `<project_folder>/project.yml` and collect the keys of its `workflows` mapping.
pub fn load_workflows(project_folder: &Path) -> Result<WorkflowCatalog, ConfigError> {
    let path = config_path(project_folder);
    let content = fs::read_to_string(&path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfigError::Missing { path: path.clone() }
        } else {
            ConfigError::Unreadable {
                path: path.clone(),
                source,
            }
        }
    })?;

    let catalog = parse_workflows(&content, &path)?;
    tracing::debug!(
        config = %path.display(),
        workflows = catalog.len(),
        "loaded workflow catalog"
    );
    Ok(catalog)
}

/// Parse the text of a project configuration. `path` is only used for error reporting.
pub fn parse_workflows(content: &str, path: &Path) -> Result<WorkflowCatalog, ConfigError> {
    let document: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let not_found = || ConfigError::WorkflowsNotFound {
        path: path.to_path_buf(),
    };
    let workflows = document
        .as_mapping()
        .and_then(|root| root.get(WORKFLOWS_KEY))
        .and_then(Value::as_mapping)
        .ok_or_else(not_found)?;

    let mut catalog = IndexMap::with_capacity(workflows.len());
    for (key, definition) in workflows {
        let name = workflow_name(key).ok_or_else(not_found)?;
        catalog.insert(name, definition.clone());
    }

    Ok(WorkflowCatalog {
        workflows: catalog,
    })
}

fn workflow_name(key: &Value) -> Option<String> {
    match key {
        Value::String(name) => Some(name.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
