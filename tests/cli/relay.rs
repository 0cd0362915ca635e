//! Relay behaviour through the binary

use crate::common::{run_relay, stderr_text, stdout_lines};

#[test]
fn test_relays_subscribed_subjects() {
    let output = run_relay(
        &["-s", "alerts", "--no-color", "--log-level", "off"],
        "alerts disk full\nmetrics cpu=3\nalerts fan failed\n",
    );

    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(
        stdout_lines(&output),
        vec!["[alerts] disk full", "[alerts] fan failed"]
    );
}

#[test]
fn test_multiple_subjects_keep_their_own_order() {
    let mut input = String::new();
    for i in 0..20 {
        input.push_str(&format!("a {}\nb {}\n", i, i));
    }

    let output = run_relay(&["-s", "a,b", "--no-color", "--log-level", "off"], &input);
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    for subject in ["a", "b"] {
        let tag = format!("[{}] ", subject);
        let received: Vec<String> = lines
            .iter()
            .filter_map(|line| line.strip_prefix(tag.as_str()))
            .map(str::to_string)
            .collect();
        assert_eq!(received, expected, "subject {}", subject);
    }
}

#[test]
fn test_summary_reports_skipped_lines() {
    let output = run_relay(
        &["-s", "alerts", "--no-color", "--log-level", "off"],
        "# header\nalerts one\nmalformed\nnobody listens\n",
    );

    assert!(output.status.success());
    let stderr = stderr_text(&output);
    assert!(
        stderr.contains("4 line(s), 1 published, 1 unrouted, 1 malformed"),
        "stderr: {}",
        stderr
    );
    assert!(stderr.contains("1 delivered"));
}

#[test]
fn test_json_logging_goes_to_stderr() {
    let output = run_relay(
        &[
            "-s",
            "alerts",
            "--no-color",
            "--log-level",
            "info",
            "--log-format",
            "json",
        ],
        "alerts one\n",
    );

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["[alerts] one"]);

    let stderr = stderr_text(&output);
    let first = stderr.lines().next().expect("expected a log line");
    let parsed: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(parsed["level"], "INF");
}
