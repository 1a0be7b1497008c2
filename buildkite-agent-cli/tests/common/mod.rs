//! Common test utilities for CLI integration tests.
//!
//! Every command runs with a cleared environment and a temporary `HOME`, so
//! the host's own agent configuration never leaks into a test.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with an isolated home directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Home directory handed to the agent
    pub home: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let home = temp_path.join("home");
        std::fs::create_dir_all(&home).expect("Failed to create home directory");

        Self {
            temp_dir,
            temp_path,
            home,
        }
    }

    /// The binary with a cleared environment and no arguments.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("buildkite-agent").expect("Failed to find buildkite-agent binary");
        cmd.env_clear().env("HOME", &self.home);
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }
        cmd
    }

    /// `buildkite-agent start` with a cleared environment.
    pub fn start(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("start");
        cmd
    }

    /// `buildkite-agent start --config <file>` for a file holding `contents`.
    pub fn start_with_config(&self, contents: &str) -> Command {
        let path = self.write_config("buildkite-agent.cfg", contents);
        let mut cmd = self.start();
        cmd.arg("--config").arg(path);
        cmd
    }

    /// Write a configuration file into the test directory.
    pub fn write_config(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write config file");
        path
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }
}

/// Parse the JSON pool record printed by `--dry-run`.
#[allow(dead_code)]
pub fn pool_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("dry run should print JSON")
}
