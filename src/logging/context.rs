use crate::cli::Command;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A person is watching the terminal.
    Interactive,
    /// Output is JSON meant for another program; the console must stay clean.
    Machine,
    /// `fichero run --detach`: launch and return.
    Detached,
}

/// Derive the active execution context from a parsed CLI command.
pub fn detect_context(command: &Command) -> ExecutionContext {
    match command {
        Command::Run(args) if args.json => ExecutionContext::Machine,
        Command::Run(args) if args.detach => ExecutionContext::Detached,
        Command::Workflows(args) if args.json => ExecutionContext::Machine,
        Command::Paths(args) if args.json => ExecutionContext::Machine,
        Command::Run(_) | Command::Workflows(_) | Command::Paths(_) => {
            ExecutionContext::Interactive
        }
    }
}
