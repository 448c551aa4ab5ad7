use crate::{
    cli::args::{LauncherArgs, PathsArgs, RunArgs, WorkflowsArgs},
    core::{
        derive_paths, load_workflows, AppError, ConfigLoader, ErrorCategory, LaunchOptions,
        LauncherSession,
    },
    Result,
};
use anyhow::anyhow;
use fichero_types::{RunSnapshot, RunState};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct WorkflowEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<String>>,
}

pub async fn workflows(args: WorkflowsArgs) -> Result<()> {
    let folder = resolve_project_folder(&args.path)?;
    let catalog = load_workflows(&folder).map_err(AppError::from)?;

    let entries: Vec<WorkflowEntry> = catalog
        .sorted_names()
        .into_iter()
        .map(|name| WorkflowEntry {
            steps: args.steps.then(|| catalog.steps(&name)).flatten(),
            name,
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", crate::core::error::WORKFLOWS_NOT_FOUND);
    }
    for entry in entries {
        match entry.steps {
            Some(steps) if !steps.is_empty() => {
                println!("{}: {}", entry.name, steps.join(" -> "))
            }
            _ => println!("{}", entry.name),
        }
    }
    Ok(())
}

pub async fn paths(args: PathsArgs) -> Result<()> {
    let folder = absolute_folder(&args.path)?;
    let options = launch_options(&args.launcher)?;
    let paths = derive_paths(&folder, &options.processor);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        println!("processor: {}", paths.processor_path.display());
        println!("config:    {}", paths.config_path.display());
        println!("log:       {}", paths.log_path.display());
        println!("manifest:  {}", paths.manifest_path.display());
    }
    Ok(())
}

pub async fn run(args: RunArgs) -> Result<()> {
    let folder = resolve_project_folder(&args.path)?;
    let options = launch_options(&args.launcher)?;
    let mut session = LauncherSession::new(options);

    session.select_folder(&folder)?;
    if let Some(ref workflow) = args.workflow {
        session.select_workflow(workflow)?;
    }

    let mut handle = session.start().ok_or_else(|| {
        AppError::new(ErrorCategory::ValidationError, "No workflow selected to run")
            .with_code("CLI-002")
    })?;
    if let Some(err) = handle.take_launch_error() {
        report(&handle.snapshot(), args.json)?;
        return Err(AppError::from(err).into());
    }
    if args.detach {
        let snapshot = handle.snapshot();
        report(&snapshot, args.json)?;
        if snapshot.state.is_terminal() {
            return finish(snapshot);
        }
        tracing::info!(run_id = %handle.run_id(), "detached from running workflow");
        return Ok(());
    }

    let mut cancel_requested = false;
    let last = loop {
        tokio::select! {
            change = handle.next_change() => match change {
                Some(snapshot) => {
                    report(&snapshot, args.json)?;
                    if snapshot.state.is_terminal() {
                        break snapshot;
                    }
                }
                None => break handle.snapshot(),
            },
            signal = tokio::signal::ctrl_c(), if !cancel_requested => {
                if let Err(err) = signal {
                    tracing::warn!(error = %err, "failed to listen for ctrl-c");
                }
                cancel_requested = true;
                if !session.cancel() {
                    tracing::debug!("ctrl-c received but nothing to cancel");
                }
            }
        }
    };

    finish(last)
}

fn report(snapshot: &RunSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!("{}", snapshot.status_message);
    }
    Ok(())
}

fn finish(snapshot: RunSnapshot) -> Result<()> {
    match snapshot.state {
        RunState::Done => Ok(()),
        RunState::Failed(reason) => Err(anyhow!("workflow failed: {}", reason)),
        other => Err(anyhow!("workflow ended in unexpected state {}", other)),
    }
}

fn launch_options(args: &LauncherArgs) -> Result<LaunchOptions> {
    let mut config = ConfigLoader::load(args.config.as_deref())?;
    if let Some(ref processor) = args.processor {
        config.processor.path = Some(processor.clone());
    }
    if let Some(ref interpreter) = args.interpreter {
        config.processor.interpreter = Some(interpreter.clone());
    }
    if args.direct {
        config.processor.interpreter = None;
    }
    Ok(config.launch_options())
}

fn absolute_folder(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// The folder must exist and be a directory; it is canonicalized so derived paths are stable.
fn resolve_project_folder(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        let mut err = AppError::new(
            ErrorCategory::ValidationError,
            format!("Project folder {} is not a directory", path.display()),
        )
        .with_code("CLI-001");
        err.add_context("path", &path.display().to_string());
        return Err(err.into());
    }
    Ok(path.canonicalize().map_err(AppError::from)?)
}
