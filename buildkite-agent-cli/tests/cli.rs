//! Integration tests for the buildkite-agent CLI.
//!
//! These tests verify that the CLI binary behaves correctly, including
//! argument parsing, help text, and version output.

use assert_cmd::Command;
use predicates::prelude::*;

/// Test that the binary fails and shows usage without a subcommand.
#[test]
fn test_cli_no_arguments() {
    let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

/// Test that the --version flag displays version information.
#[test]
fn test_cli_version_flag() {
    let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");

    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("buildkite-agent"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that the --help flag displays help text.
#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");

    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Configure and start a Buildkite agent"))
        .stdout(predicate::str::contains("start"));
}

/// Test that `start --help` lists every agent flag with its environment variable.
#[test]
fn test_start_help_lists_flags_defaults_and_env() {
    let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");

    cmd.args(["start", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("bootstrap-script"))
        .stdout(predicate::str::contains("--token"))
        .stdout(predicate::str::contains("BUILDKITE_AGENT_TOKEN"))
        .stdout(predicate::str::contains("--no-automatic-ssh-fingerprint-verification"))
        .stdout(predicate::str::contains("https://agent.buildkite.com/v3"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("PTY"));
}

/// Test that an invalid subcommand produces a usage error.
#[test]
fn test_cli_invalid_subcommand() {
    let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");

    cmd.arg("invalid-command");

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

/// Test that an unknown start flag is a usage error.
#[test]
fn test_start_unknown_flag() {
    let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");

    cmd.args(["start", "--tokne", "abc"]);

    cmd.assert().failure().code(2);
}

/// Test that a non-numeric timeout is rejected during argument parsing.
#[test]
fn test_start_invalid_timeout_flag() {
    let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");

    cmd.args(["start", "--disconnect-after-job-timeout", "soon"]);

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("disconnect-after-job-timeout"));
}
