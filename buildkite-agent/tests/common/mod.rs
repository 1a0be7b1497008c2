//! Common test utilities for integration tests.
//!
//! This module provides helpers for building isolated configuration
//! environments: a temporary directory holding candidate files, and a
//! builder that never touches the real process environment or the real
//! candidate locations.

use std::fs;
use std::path::{Path, PathBuf};

use buildkite_agent::config::{ConfigBuilder, EnvVars};
use buildkite_agent::Platform;
use tempfile::TempDir;

/// A temporary directory with numbered candidate file slots.
pub struct CandidateDir {
    dir: TempDir,
    count: usize,
}

impl CandidateDir {
    /// Create `count` candidate slots. None of the files exist yet.
    pub fn new(count: usize) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            count,
        }
    }

    /// Path of slot `index`.
    pub fn path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("candidate-{index}.cfg"))
    }

    /// All candidate paths in priority order.
    pub fn paths(&self) -> Vec<PathBuf> {
        (0..self.count).map(|i| self.path(i)).collect()
    }

    /// Write `contents` to slot `index`.
    pub fn write(&self, index: usize, contents: &str) -> PathBuf {
        let path = self.path(index);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Root of the temporary directory.
    #[allow(dead_code)]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Build an environment snapshot from pairs.
pub fn env(pairs: &[(&str, &str)]) -> EnvVars {
    pairs.iter().copied().collect()
}

/// A builder isolated from the host: synthetic environment, fixed working
/// and home directories, Unix platform, and the given candidates.
pub fn isolated_builder(env: EnvVars, candidates: Vec<PathBuf>) -> ConfigBuilder {
    ConfigBuilder::new()
        .with_env(env)
        .with_candidate_paths(candidates)
        .with_working_dir(PathBuf::from("/work"))
        .with_home(Some(PathBuf::from("/home/ci")))
        .with_platform(Platform::Unix)
}
