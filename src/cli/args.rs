use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct WorkflowsArgs {
    /// Project folder containing project.yml
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Also list the steps of each workflow
    #[arg(long)]
    pub steps: bool,

    /// Emit JSON instead of one name per line
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PathsArgs {
    /// Project folder to derive paths from
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub launcher: LauncherArgs,

    /// Emit JSON instead of aligned text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Project folder containing project.yml
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Workflow to run (default: first workflow name in sorted order)
    #[arg(long, short = 'w', value_name = "NAME")]
    pub workflow: Option<String>,

    #[command(flatten)]
    pub launcher: LauncherArgs,

    /// Return as soon as the processor has started instead of waiting for it
    #[arg(long, help_heading = "Output Options")]
    pub detach: bool,

    /// Print each state change as a JSON line
    #[arg(long, help_heading = "Output Options")]
    pub json: bool,
}

/// Flags that override launcher.toml and the environment.
#[derive(Args, Debug)]
pub struct LauncherArgs {
    /// Processor entry point (default: ../fichero_cli/fichero_cli.py next to the project)
    #[arg(long, value_name = "FILE", help_heading = "Processor")]
    pub processor: Option<PathBuf>,

    /// Program used to run the processor (default: python3)
    #[arg(long, value_name = "PROGRAM", help_heading = "Processor")]
    pub interpreter: Option<PathBuf>,

    /// Execute the processor itself instead of passing it to an interpreter
    #[arg(long, conflicts_with = "interpreter", help_heading = "Processor")]
    pub direct: bool,

    /// Path to launcher config (default: <config dir>/fichero/launcher.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}
