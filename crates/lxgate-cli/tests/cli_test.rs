//! Integration tests for the `lxgate` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling -- all without requiring a live gateway.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `lxgate` binary with env isolation.
///
/// Clears all `LXGATE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn lxgate_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lxgate");
    cmd.env("HOME", "/tmp/lxgate-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/lxgate-cli-test-nonexistent")
        .env_remove("LXGATE_PROFILE")
        .env_remove("LXGATE_GATEWAY")
        .env_remove("LXGATE_TOKEN")
        .env_remove("LXGATE_OUTPUT")
        .env_remove("LXGATE_INSECURE")
        .env_remove("LXGATE_TIMEOUT")
        .env_remove("LXGATE_USERNAME")
        .env_remove("LXGATE_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = lxgate_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    lxgate_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("sensor security gateway")
            .and(predicate::str::contains("logs"))
            .and(predicate::str::contains("simulate"))
            .and(predicate::str::contains("sensors")),
    );
}

#[test]
fn test_version_flag() {
    lxgate_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lxgate"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    lxgate_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    lxgate_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    lxgate_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = lxgate_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_logs_list_no_gateway() {
    lxgate_cmd()
        .args(["logs", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("gateway"))
                .or(predicate::str::contains("profile")),
        );
}

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists -- it just renders the default config.
    lxgate_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_invalid_output_format() {
    let output = lxgate_cmd()
        .args(["--output", "invalid", "logs", "list"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly -- the failure should be about
    // missing gateway config, not about argument parsing.
    lxgate_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--insecure",
            "--timeout",
            "60",
            "logs",
            "list",
        ])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("gateway"))
                .or(predicate::str::contains("profile")),
        );
}

#[test]
fn test_invalid_severity_filter() {
    let output = lxgate_cmd()
        .args([
            "--gateway",
            "http://127.0.0.1:1",
            "logs",
            "list",
            "--severity",
            "catastrophic",
        ])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid severity"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("low") || text.contains("severity"),
        "Expected error naming valid severities:\n{text}"
    );
}

#[test]
fn test_invalid_date_filter() {
    let output = lxgate_cmd()
        .args([
            "--gateway",
            "http://127.0.0.1:1",
            "logs",
            "list",
            "--date",
            "not-a-date",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success(), "Expected failure for invalid date");
    let text = combined_output(&output);
    assert!(
        text.contains("YYYY-MM-DD") || text.contains("date"),
        "Expected error naming the date format:\n{text}"
    );
}

#[test]
fn test_simulate_run_unknown_kind() {
    let output = lxgate_cmd()
        .args([
            "--gateway",
            "http://127.0.0.1:1",
            "simulate",
            "run",
            "teleport",
        ])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for unknown attack kind"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("teleport") || text.contains("simulate types"),
        "Expected error mentioning the unknown kind:\n{text}"
    );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_logs_subcommands_exist() {
    lxgate_cmd()
        .args(["logs", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("export"))
                .and(predicate::str::contains("watch"))
                .and(predicate::str::contains("reset")),
        );
}

#[test]
fn test_simulate_subcommands_exist() {
    lxgate_cmd()
        .args(["simulate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("types").and(predicate::str::contains("run")));
}

#[test]
fn test_sensors_subcommands_exist() {
    lxgate_cmd()
        .args(["sensors", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("readings"))
                .and(predicate::str::contains("averages")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    lxgate_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("profiles"))
                .and(predicate::str::contains("set-token")),
        );
}

#[test]
fn test_users_subcommands_exist() {
    lxgate_cmd()
        .args(["users", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("add"))
                .and(predicate::str::contains("remove")),
        );
}
