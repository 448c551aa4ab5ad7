pub mod args;
pub mod commands;

pub use args::{LauncherArgs, PathsArgs, RunArgs, WorkflowsArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
WORKFLOW COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "fichero")]
#[command(version = crate::VERSION)]
#[command(about = "Launch fichero project workflows")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: list the workflows of a project, check the derived paths, then run one."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "List workflows declared in project.yml",
        long_about = "Workflows reads <PATH>/project.yml and prints the keys of its top-level `workflows` mapping.",
        after_help = "Example:\n    fichero workflows ./my-project --steps"
    )]
    Workflows(WorkflowsArgs),
    #[command(
        about = "Show the files a run would use",
        long_about = "Paths prints the processor, config, log and manifest paths derived from the project folder. Nothing is checked or written there.",
        after_help = "Example:\n    fichero paths ./my-project --processor /opt/fichero_cli/fichero_cli.py"
    )]
    Paths(PathsArgs),
    #[command(
        about = "Run one workflow with the external processor",
        long_about = "Run starts `<processor> run-workflow <config> <workflow> --log-file <log> --manifest-file <manifest>` and reports its progress until it exits. Ctrl-C cancels the run.",
        after_help = "Example:\n    fichero run ./my-project --workflow ocr --interpreter /usr/bin/python3"
    )]
    Run(RunArgs),
}

pub async fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Workflows(workflows_args) => commands::workflows(workflows_args).await,
        Command::Paths(paths_args) => commands::paths(paths_args).await,
        Command::Run(run_args) => commands::run(run_args).await,
    }
}
