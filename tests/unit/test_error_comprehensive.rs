use fichero::core::error::{LaunchError, TransitionError, WORKFLOWS_NOT_FOUND};
use fichero::core::{AppError, ConfigError, ErrorCategory, ErrorSeverity};
use std::io;
use std::path::PathBuf;

#[test]
fn test_launch_error_converts_with_status_text() {
    let err: AppError = LaunchError {
        program: PathBuf::from("/proj/../fichero_cli/fichero_cli.py"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
    }
    .into();

    assert_eq!(err.category, ErrorCategory::LaunchError);
    assert_eq!(err.code, "RUN-001");
    assert_eq!(err.message, "Failed to launch CLI: Permission denied");
    assert!(err.context.contains_key("program"));
    assert!(!err.recovery_suggestions.is_empty());
}

#[test]
fn test_every_config_failure_reads_the_same() {
    let path = PathBuf::from("/proj/project.yml");
    let errors = vec![
        ConfigError::Missing { path: path.clone() },
        ConfigError::Unreadable {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::Other, "Is a directory"),
        },
        ConfigError::Malformed {
            path: path.clone(),
            source: serde_yaml::from_str::<serde_yaml::Value>("a: [b").unwrap_err(),
        },
        ConfigError::WorkflowsNotFound { path },
    ];

    for error in errors {
        let app: AppError = error.into();
        assert_eq!(app.message, WORKFLOWS_NOT_FOUND);
        assert_eq!(app.code, "CFG-001");
        assert!(app.source.is_some());
    }
}

#[test]
fn test_transition_error_is_a_warning() {
    let err: AppError = TransitionError::AlreadyRunning.into();
    assert_eq!(err.category, ErrorCategory::StateError);
    assert_eq!(err.severity(), ErrorSeverity::Warning);
    assert_eq!(err.message, "a run is already in progress");
    assert_eq!(err.code, "RUN-002");
    assert!(!err.recovery_suggestions.is_empty());
}

#[test]
fn test_display_includes_code_and_context() {
    let mut err = AppError::new(ErrorCategory::ValidationError, "Unknown workflow 'x'")
        .with_code("CFG-002");
    err.add_context("available", "export, ocr");
    let rendered = err.to_string();
    assert!(rendered.starts_with("[CFG-002] ValidationError: Unknown workflow 'x'"));
    assert!(rendered.contains("export, ocr"));
}

#[test]
fn test_io_error_conversion() {
    let err: AppError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
    assert_eq!(err.category, ErrorCategory::IoError);
    assert_eq!(err.code, "IO_ERROR");
}
