use clap::Parser;
use fichero::cli::{self, Args};
use fichero::core::{AppError, DefaultErrorReporter, ErrorReporter};
use fichero::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let guard = match logging::init(&args.command) {
        Ok(guard) => Some(guard),
        Err(err) => {
            DefaultErrorReporter::new()
                .report_warning("logging disabled", Some(format!("{:#}", err)));
            None
        }
    };
    if let Some(ref guard) = guard {
        tracing::debug!(log_file = %guard.log_file_path().display(), "logging initialized");
    }

    let result = cli::run(args).await;
    drop(guard);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_error) => DefaultErrorReporter::new().report_error(app_error),
                None => eprintln!("[ERROR] {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
