#[path = "../support/mod.rs"]
mod support;

use fichero::core::launcher::DEFAULT_INTERPRETER;
use fichero::core::{LaunchOptions, ProcessorLocation, RunLauncher};
use fichero::RunState;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use support::{install_sibling_processor, project_with_config, FakeSpawner, TWO_WORKFLOWS};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(20);

fn shell_options() -> LaunchOptions {
    LaunchOptions {
        processor: ProcessorLocation::Sibling,
        interpreter: Some(PathBuf::from("/bin/sh")),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_missing_processor_fails_without_running() {
    let (_root, project) = project_with_config(TWO_WORKFLOWS);
    let mut launcher = RunLauncher::new(LaunchOptions {
        processor: ProcessorLocation::Explicit(project.join("no-such-dir/fichero_cli.py")),
        interpreter: None,
    });

    let handle = launcher.start(Some(&project), Some("ocr")).unwrap();
    let snapshot = handle.snapshot();

    let reason = snapshot.state.failure_reason().unwrap().to_string();
    assert!(reason.contains("No such file or directory"), "{}", reason);
    assert_eq!(
        snapshot.status_message,
        format!("Failed to launch CLI: {}", reason)
    );
    assert_eq!(snapshot.started_at, snapshot.finished_at);
    assert!(!launcher.is_running());
}

#[cfg(unix)]
#[tokio::test]
async fn test_successful_run_passes_exact_argv() {
    let (root, project) = project_with_config(TWO_WORKFLOWS);
    let script = install_sibling_processor(root.path(), "exit 0");
    let mut launcher = RunLauncher::new(shell_options());

    let mut handle = launcher.start(Some(&project), Some("ocr")).unwrap();
    let done = timeout(WAIT, handle.wait()).await.unwrap();

    assert_eq!(done.state, RunState::Done);
    assert_eq!(done.status_message, "Done!");
    assert_eq!(done.exit_code, Some(0));
    assert_eq!(done.workflow.as_deref(), Some("ocr"));

    let recorded = fs::read_to_string(script.parent().unwrap().join("argv.txt")).unwrap();
    let recorded: Vec<&str> = recorded.lines().collect();
    let expected = vec![
        root.path().join("fichero_cli/fichero_cli.py").display().to_string(),
        "run-workflow".to_string(),
        project.join("project.yml").display().to_string(),
        "ocr".to_string(),
        "--log-file".to_string(),
        project.join("fichero_cli.log").display().to_string(),
        "--manifest-file".to_string(),
        project.join("manifest.jsonl").display().to_string(),
    ];
    assert_eq!(recorded, expected);
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_is_failure_with_code() {
    let (root, project) = project_with_config(TWO_WORKFLOWS);
    install_sibling_processor(root.path(), "exit 3");
    let mut launcher = RunLauncher::new(shell_options());

    let mut handle = launcher.start(Some(&project), Some("export")).unwrap();
    let finished = timeout(WAIT, handle.wait()).await.unwrap();

    assert_eq!(
        finished.state,
        RunState::Failed("exited with status 3".to_string())
    );
    assert_eq!(finished.exit_code, Some(3));
    assert_eq!(
        finished.status_message,
        "Workflow export exited with status 3"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancel_kills_the_processor() {
    let (root, project) = project_with_config(TWO_WORKFLOWS);
    install_sibling_processor(root.path(), "exec sleep 30");
    let mut launcher = RunLauncher::new(shell_options());

    let mut handle = launcher.start(Some(&project), Some("ocr")).unwrap();
    assert_eq!(handle.state(), RunState::Running);
    assert!(launcher.start(Some(&project), Some("ocr")).is_none());

    assert!(launcher.cancel());
    let finished = timeout(WAIT, handle.wait()).await.unwrap();
    assert_eq!(finished.state, RunState::Failed("cancelled".to_string()));
    assert_eq!(finished.status_message, "Cancelled");
    assert!(!launcher.cancel());
}

#[tokio::test]
async fn test_second_start_while_running_spawns_nothing() {
    let (_root, project) = project_with_config(TWO_WORKFLOWS);
    let spawner = Arc::new(FakeSpawner::default());
    let mut launcher = RunLauncher::with_spawner(LaunchOptions::default(), spawner.clone());

    let mut handle = launcher.start(Some(&project), Some("ocr")).unwrap();
    assert_eq!(handle.state(), RunState::Running);
    assert!(launcher.start(Some(&project), Some("export")).is_none());
    assert_eq!(spawner.spawn_count(), 1);

    spawner.exit_next(Some(0));
    let done = timeout(WAIT, handle.wait()).await.unwrap();
    assert_eq!(done.state, RunState::Done);

    let mut again = launcher.start(Some(&project), Some("export")).unwrap();
    assert_ne!(again.run_id(), handle.run_id());
    assert_eq!(spawner.spawn_count(), 2);
    spawner.exit_next(None);
    let finished = timeout(WAIT, again.wait()).await.unwrap();
    assert_eq!(
        finished.state,
        RunState::Failed("terminated by signal".to_string())
    );
}

#[tokio::test]
async fn test_launch_error_reports_os_text() {
    let (_root, project) = project_with_config(TWO_WORKFLOWS);
    let spawner = Arc::new(FakeSpawner::failing(std::io::ErrorKind::NotFound));
    let mut launcher = RunLauncher::with_spawner(LaunchOptions::default(), spawner.clone());

    let mut handle = launcher.start(Some(&project), Some("ocr")).unwrap();
    let snapshot = timeout(WAIT, handle.wait()).await.unwrap();
    assert_eq!(
        snapshot.state,
        RunState::Failed("No such file or directory".to_string())
    );
    assert_eq!(spawner.spawn_count(), 1);

    let launch_error = handle.take_launch_error().unwrap();
    assert_eq!(launch_error.reason(), "No such file or directory");
    assert_eq!(launch_error.program, PathBuf::from(DEFAULT_INTERPRETER));
    assert!(handle.take_launch_error().is_none());

    // A failed launch leaves the launcher free for the next attempt.
    assert!(launcher.start(Some(&project), Some("ocr")).is_some());
    assert_eq!(spawner.spawn_count(), 2);
}

#[tokio::test]
async fn test_interpreter_receives_full_argv() {
    let (_root, project) = project_with_config(TWO_WORKFLOWS);
    let spawner = Arc::new(FakeSpawner::default());
    let mut launcher = RunLauncher::with_spawner(
        LaunchOptions {
            processor: ProcessorLocation::Sibling,
            interpreter: Some(PathBuf::from("/usr/bin/python3")),
        },
        spawner.clone(),
    );

    launcher.start(Some(&project), Some("ocr")).unwrap();
    let invocation = spawner.invocations().remove(0);
    let request = launcher.request_for(&project, "ocr");
    assert_eq!(invocation.program, PathBuf::from("/usr/bin/python3"));
    assert_eq!(invocation.args, request.argv());
}

#[tokio::test]
async fn test_default_options_hand_processor_to_python() {
    let (root, project) = project_with_config(TWO_WORKFLOWS);
    let spawner = Arc::new(FakeSpawner::default());
    let mut launcher = RunLauncher::with_spawner(LaunchOptions::default(), spawner.clone());

    let mut handle = launcher.start(Some(&project), Some("ocr")).unwrap();
    assert!(handle.take_launch_error().is_none());

    let invocation = spawner.invocations().remove(0);
    assert_eq!(invocation.program, PathBuf::from(DEFAULT_INTERPRETER));
    assert_eq!(
        PathBuf::from(&invocation.args[0]),
        root.path().join("fichero_cli/fichero_cli.py")
    );
    assert_eq!(invocation.args, launcher.request_for(&project, "ocr").argv());
}

#[cfg(unix)]
#[tokio::test]
async fn test_default_options_run_non_executable_script() {
    use std::os::unix::fs::PermissionsExt;

    let python_available = std::process::Command::new(DEFAULT_INTERPRETER)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if !python_available {
        eprintln!("skipping: {} not on PATH", DEFAULT_INTERPRETER);
        return;
    }

    let (root, project) = project_with_config(TWO_WORKFLOWS);
    let dir = root.path().join("fichero_cli");
    fs::create_dir_all(&dir).unwrap();
    let script = dir.join("fichero_cli.py");
    fs::write(
        &script,
        "import sys\nassert sys.argv[1] == 'run-workflow'\nsys.exit(0)\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

    let mut launcher = RunLauncher::new(LaunchOptions::default());
    let mut handle = launcher.start(Some(&project), Some("ocr")).unwrap();
    let finished = timeout(WAIT, handle.wait()).await.unwrap();
    assert_eq!(finished.state, RunState::Done, "{}", finished.status_message);
}
