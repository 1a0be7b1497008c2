//! The agent pool record and the runners that start it.
//!
//! The pool itself (job polling and execution) lives outside this crate. It
//! is reached through the [`AgentPoolRunner`] trait, whose only operation is a
//! blocking `start`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ResolvedConfig;

/// Per-job settings handed to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AgentConfiguration {
    /// Bootstrap script invoked for each job.
    pub bootstrap_script: PathBuf,
    /// Directory builds run from.
    pub build_path: PathBuf,
    /// Directory containing hook scripts.
    pub hooks_path: PathBuf,
    /// Directory plugins are saved to.
    pub plugins_path: PathBuf,
    /// Flags passed to `git clone`.
    pub git_clone_flags: String,
    /// Flags passed to `git clean`.
    pub git_clean_flags: String,
    /// Verify SSH host fingerprints automatically.
    pub ssh_fingerprint_verification: bool,
    /// Allow arbitrary console commands.
    pub command_eval: bool,
    /// Run jobs inside a pseudo terminal.
    pub run_in_pty: bool,
    /// Disconnect after running a single job.
    pub disconnect_after_job: bool,
    /// Seconds to wait for a job when disconnecting after one.
    pub disconnect_after_job_timeout: u64,
}

/// Everything the external pool needs to register and run the agent.
///
/// Built from a validated [`ResolvedConfig`]; negative flags become positive
/// capabilities here.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::ResolvedConfig;
/// use buildkite_agent::AgentPool;
///
/// let config = ResolvedConfig { no_pty: true, no_color: false, ..ResolvedConfig::default() };
/// let pool = AgentPool::from_config(&config, None);
///
/// assert!(!pool.agent_configuration.run_in_pty);
/// assert!(pool.color);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AgentPool {
    /// Agent registration token.
    pub token: String,
    /// Agent name.
    pub name: String,
    /// Agent priority.
    pub priority: String,
    /// `key=value` meta-data tags.
    pub meta_data: Vec<String>,
    /// Include EC2 instance meta-data.
    pub meta_data_ec2: bool,
    /// Include EC2 tags.
    pub meta_data_ec2_tags: bool,
    /// Include Google Cloud meta-data.
    pub meta_data_gcp: bool,
    /// Agent API endpoint.
    pub endpoint: String,
    /// Experimental features to enable.
    pub experiments: Vec<String>,
    /// Enable debug logging.
    pub debug: bool,
    /// Enable HTTP debug logging.
    pub debug_http: bool,
    /// Colour log output.
    pub color: bool,
    /// Configuration file that was loaded, shown at startup.
    pub config_file_path: Option<PathBuf>,
    /// Per-job settings.
    pub agent_configuration: AgentConfiguration,
}

impl AgentPool {
    /// Project a validated configuration onto the pool record.
    #[must_use]
    pub fn from_config(config: &ResolvedConfig, config_file: Option<&Path>) -> Self {
        Self {
            token: config.token.clone(),
            name: config.name.clone(),
            priority: config.priority.clone(),
            meta_data: config.meta_data.clone(),
            meta_data_ec2: config.meta_data_ec2,
            meta_data_ec2_tags: config.meta_data_ec2_tags,
            meta_data_gcp: config.meta_data_gcp,
            endpoint: config.endpoint.clone(),
            experiments: config.experiments.clone(),
            debug: config.debug,
            debug_http: config.debug_http,
            color: !config.no_color,
            config_file_path: config_file.map(Path::to_path_buf),
            agent_configuration: AgentConfiguration {
                bootstrap_script: config.bootstrap_script.clone(),
                build_path: config.build_path.clone(),
                hooks_path: config.hooks_path.clone(),
                plugins_path: config.plugins_path.clone(),
                git_clone_flags: config.git_clone_flags.clone(),
                git_clean_flags: config.git_clean_flags.clone(),
                ssh_fingerprint_verification: !config.no_ssh_fingerprint_verification,
                command_eval: !config.no_command_eval,
                run_in_pty: !config.no_pty,
                disconnect_after_job: config.disconnect_after_job,
                disconnect_after_job_timeout: config.disconnect_after_job_timeout,
            },
        }
    }
}

/// Failure reported by an agent pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool executable could not be launched.
    #[error("failed to launch agent pool '{}': {source}", program.display())]
    Spawn {
        /// The executable that was launched.
        program: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The pool record could not be handed to the pool.
    #[error("failed to hand configuration to agent pool: {0}")]
    Handoff(#[source] io::Error),

    /// The pool record could not be encoded.
    #[error("failed to encode agent pool configuration: {0}")]
    Encode(#[from] serde_json::Error),

    /// The pool exited unsuccessfully.
    #[error("agent pool exited with {status}")]
    Exited {
        /// The pool's exit status.
        status: ExitStatus,
    },

    /// Any other failure, described by the pool.
    #[error("{0}")]
    Other(String),
}

/// Something that can run an agent pool.
///
/// `start` blocks for the lifetime of the pool and returns only when it
/// stops or fails to start.
#[cfg_attr(test, mockall::automock)]
pub trait AgentPoolRunner {
    /// Start the pool and block until it stops.
    ///
    /// # Errors
    ///
    /// Returns a [`PoolError`] if the pool fails to start or stops with an
    /// error.
    fn start(&self, pool: &AgentPool) -> Result<(), PoolError>;
}

/// Runs the pool as a child process.
///
/// The pool record is written as JSON to the child's stdin, which is then
/// closed. The child's stdout and stderr are inherited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessPool {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessPool {
    /// Default pool executable, looked up on `PATH`.
    pub const DEFAULT_PROGRAM: &'static str = "buildkite-agent-pool";

    /// Runner for `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument passed to the pool executable.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The executable this runner launches.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ProcessPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl AgentPoolRunner for ProcessPool {
    fn start(&self, pool: &AgentPool) -> Result<(), PoolError> {
        let payload = serde_json::to_vec(pool)?;

        log::debug!("Launching agent pool {}", self.program.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| PoolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(stdin) = child.stdin.take() {
            hand_off(&mut child, stdin, &payload)?;
        }

        let status = child.wait().map_err(PoolError::Handoff)?;
        if status.success() {
            Ok(())
        } else {
            Err(PoolError::Exited { status })
        }
    }
}

/// Write the pool record to the child and close its input.
///
/// A pool that cannot receive its record is killed and reaped before the
/// error is returned.
fn hand_off(child: &mut Child, mut input: impl Write, payload: &[u8]) -> Result<(), PoolError> {
    match input.write_all(payload) {
        Ok(()) => Ok(()),
        // A pool that exits without reading its input still reports through
        // its exit status.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => {
            drop(input);
            if let Err(kill) = child.kill() {
                log::debug!("Could not kill agent pool: {kill}");
            }
            if let Err(wait) = child.wait() {
                log::debug!("Could not reap agent pool: {wait}");
            }
            Err(PoolError::Handoff(e))
        }
    }
}
