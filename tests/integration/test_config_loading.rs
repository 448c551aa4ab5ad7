use fichero::core::config::loader::{INTERPRETER_ENV, PROCESSOR_ENV};
use fichero::core::launcher::DEFAULT_INTERPRETER;
use fichero::core::{ConfigLoader, LauncherConfig, ProcessorLocation};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_fichero_env() {
    env::remove_var(PROCESSOR_ENV);
    env::remove_var(INTERPRETER_ENV);
}

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("launcher.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_file_values_become_launch_options() {
    clear_fichero_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[processor]\npath = \"/opt/fichero_cli/fichero_cli.py\"\ninterpreter = \"/usr/bin/python3\"\n",
    );

    let options = ConfigLoader::load(Some(&path)).unwrap().launch_options();
    assert_eq!(
        options.processor,
        ProcessorLocation::Explicit(PathBuf::from("/opt/fichero_cli/fichero_cli.py"))
    );
    assert_eq!(options.interpreter, Some(PathBuf::from("/usr/bin/python3")));
}

#[test]
#[serial]
fn test_empty_file_defaults_to_sibling_processor_under_python() {
    clear_fichero_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let config = ConfigLoader::load(Some(&path)).unwrap();
    assert_eq!(config, LauncherConfig::default());
    let options = config.launch_options();
    assert_eq!(options.processor, ProcessorLocation::Sibling);
    assert_eq!(options.interpreter, Some(PathBuf::from(DEFAULT_INTERPRETER)));
}

#[test]
#[serial]
fn test_processor_section_without_interpreter_keeps_python() {
    clear_fichero_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[processor]\npath = \"/opt/fichero_cli.py\"\n");

    let config = ConfigLoader::load(Some(&path)).unwrap();
    assert_eq!(
        config.processor.interpreter,
        Some(PathBuf::from(DEFAULT_INTERPRETER))
    );
}

#[test]
#[serial]
fn test_empty_interpreter_runs_processor_directly() {
    clear_fichero_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[processor]\ninterpreter = \"\"\n");

    let options = ConfigLoader::load(Some(&path)).unwrap().launch_options();
    assert_eq!(options.interpreter, None);

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    env::set_var(INTERPRETER_ENV, "");
    let config = ConfigLoader::load(Some(&path));
    clear_fichero_env();
    assert_eq!(config.unwrap().processor.interpreter, None);
}

#[test]
#[serial]
fn test_env_overrides_take_precedence_over_file() {
    clear_fichero_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[processor]\npath = \"/opt/from-file.py\"\n");

    env::set_var(PROCESSOR_ENV, "/opt/from-env.py");
    env::set_var(INTERPRETER_ENV, "/bin/sh");
    let config = ConfigLoader::load(Some(&path));
    clear_fichero_env();

    let config = config.unwrap();
    assert_eq!(config.processor.path, Some(PathBuf::from("/opt/from-env.py")));
    assert_eq!(config.processor.interpreter, Some(PathBuf::from("/bin/sh")));
}

#[test]
#[serial]
fn test_blank_env_value_clears_file_setting() {
    clear_fichero_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[processor]\npath = \"/opt/from-file.py\"\ninterpreter = \"/usr/bin/python3\"\n",
    );

    env::set_var(PROCESSOR_ENV, "  ");
    let config = ConfigLoader::load(Some(&path));
    clear_fichero_env();

    let config = config.unwrap();
    assert_eq!(config.processor.path, None);
    assert_eq!(
        config.processor.interpreter,
        Some(PathBuf::from("/usr/bin/python3"))
    );
}

#[test]
#[serial]
fn test_empty_path_in_file_fails_validation() {
    clear_fichero_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[processor]\npath = \"\"\n");

    let err = ConfigLoader::load(Some(&path)).unwrap_err();
    assert!(err.message.contains("processor.path cannot be empty"));
}
