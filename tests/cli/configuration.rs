//! Configuration file handling and exit codes

use crate::common::{run_relay, run_relay_in, stderr_text, stdout_lines};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_subjects_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("relay.toml");
    fs::write(
        &config,
        "[subscribers]\nsubjects = [\"jobs\"]\n\n[logging]\nlevel = \"off\"\ncolor = false\n",
    )
    .unwrap();

    let output = run_relay(
        &["--config-file", config.to_str().unwrap()],
        "jobs build\nalerts ignored\n",
    );

    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_lines(&output), vec!["[jobs] build"]);
}

#[test]
fn test_default_config_location() {
    let home = TempDir::new().unwrap();
    // XDG layout on Linux, Application Support on macOS
    for base in [home.path().to_path_buf(), home.path().join("Library/Application Support")] {
        let config_dir = base.join("AsyncQueue");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("asyncqueue.toml"),
            "[subscribers]\nsubjects = [\"defaults\"]\n",
        )
        .unwrap();
    }

    let output = run_relay_in(
        home.path(),
        &["--no-color", "--log-level", "off"],
        "defaults picked up\n",
    );

    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_lines(&output), vec!["[defaults] picked up"]);
}

#[test]
fn test_command_line_subjects_override_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("relay.toml");
    fs::write(&config, "[subscribers]\nsubjects = [\"jobs\"]\n").unwrap();

    let output = run_relay(
        &[
            "--config-file",
            config.to_str().unwrap(),
            "-s",
            "alerts",
            "--no-color",
            "--log-level",
            "off",
        ],
        "jobs build\nalerts raised\n",
    );

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["[alerts] raised"]);
}

#[test]
fn test_missing_config_file_exits_with_usage_error() {
    let output = run_relay(&["--config-file", "/nonexistent/asyncqueue.toml"], "");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_text(&output).contains("does not exist"));
}

#[test]
fn test_unknown_config_key_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("relay.toml");
    fs::write(&config, "[queue]\ncapacity = 4\nbogus = true\n").unwrap();

    let output = run_relay(&["--config-file", config.to_str().unwrap(), "-s", "a"], "");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_text(&output).contains("Error parsing configuration file"));
}

#[test]
fn test_no_subjects_is_a_usage_error() {
    let output = run_relay(&["--log-level", "off"], "alerts one\n");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_text(&output).contains("at least one subject"));
}
