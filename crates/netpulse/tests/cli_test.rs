//! Integration tests for the `netpulse` binary.
//!
//! These validate argument parsing, help output, completions, and the
//! database-backed config/history commands against a temporary
//! database -- no collector needs to be running.
#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `netpulse` binary with env isolation.
fn netpulse_cmd() -> Command {
    let mut cmd = Command::cargo_bin("netpulse").unwrap();
    cmd.env_remove("NETPULSE_DB");
    cmd
}

/// Same, but pointed at a database inside `dir`.
fn netpulse_with_db(dir: &tempfile::TempDir) -> Command {
    let mut cmd = netpulse_cmd();
    cmd.arg("--db").arg(dir.path().join("netpulse.db"));
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = netpulse_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected usage exit code");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    netpulse_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("network traffic")
            .and(predicate::str::contains("run"))
            .and(predicate::str::contains("collect"))
            .and(predicate::str::contains("interfaces"))
            .and(predicate::str::contains("history")),
    );
}

#[test]
fn test_version_flag() {
    netpulse_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netpulse"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let output = netpulse_cmd().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_completions_generate() {
    netpulse_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("netpulse"));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_set_then_get_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    netpulse_with_db(&dir)
        .args(["config", "set", "collector.polling_interval", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("collector.polling_interval = 15"));

    netpulse_with_db(&dir)
        .args(["config", "get", "collector.polling_interval"])
        .assert()
        .success()
        .stdout(predicate::str::contains("15"));
}

#[test]
fn test_config_get_missing_key_exits_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let output = netpulse_with_db(&dir)
        .args(["config", "get", "collector.nonexistent"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_config_init_seeds_defaults() {
    let dir = tempfile::tempdir().unwrap();

    netpulse_with_db(&dir)
        .args(["config", "init"])
        .assert()
        .success();

    netpulse_with_db(&dir)
        .args(["config", "get", "collector.polling_interval"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30"));
}

// ── History & status ────────────────────────────────────────────────

#[test]
fn test_history_on_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    netpulse_with_db(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No traffic records"));
}

#[test]
fn test_history_rejects_bad_window() {
    let dir = tempfile::tempdir().unwrap();
    let output = netpulse_with_db(&dir)
        .args(["history", "--window", "90m"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_status_reports_stopped_collector() {
    let dir = tempfile::tempdir().unwrap();
    netpulse_with_db(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running: false"));
}

#[test]
fn test_status_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = netpulse_with_db(&dir)
        .args(["status", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status --output json must be valid JSON");
    assert_eq!(parsed["collector"]["is_running"], false);
}
