//! The fully merged agent configuration.

use std::path::PathBuf;

/// Configuration for `agent start` after merging all sources.
///
/// Built once per process by [`ConfigBuilder`](crate::config::ConfigBuilder);
/// immutable once validation succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ResolvedConfig {
    /// Agent registration token.
    pub token: String,
    /// Agent name.
    pub name: String,
    /// Agent priority.
    pub priority: String,
    /// Disconnect after running a single job.
    pub disconnect_after_job: bool,
    /// Seconds to wait for a job when `disconnect_after_job` is set.
    pub disconnect_after_job_timeout: u64,
    /// Free-form `key=value` tags, in the order given.
    pub meta_data: Vec<String>,
    /// Include EC2 instance meta-data.
    pub meta_data_ec2: bool,
    /// Include EC2 tags.
    pub meta_data_ec2_tags: bool,
    /// Include Google Cloud meta-data.
    pub meta_data_gcp: bool,
    /// Flags passed to `git clone`.
    pub git_clone_flags: String,
    /// Flags passed to `git clean`.
    pub git_clean_flags: String,
    /// Bootstrap script invoked for each job.
    pub bootstrap_script: PathBuf,
    /// Directory builds run from.
    pub build_path: PathBuf,
    /// Directory containing hook scripts (empty when unset).
    pub hooks_path: PathBuf,
    /// Directory plugins are saved to (empty when unset).
    pub plugins_path: PathBuf,
    /// Do not run jobs within a pseudo terminal.
    pub no_pty: bool,
    /// Do not verify SSH fingerprints automatically.
    pub no_ssh_fingerprint_verification: bool,
    /// Do not allow arbitrary console commands.
    pub no_command_eval: bool,
    /// Experimental features to enable.
    pub experiments: Vec<String>,
    /// Agent API endpoint.
    pub endpoint: String,
    /// Disable coloured log output.
    pub no_color: bool,
    /// Enable debug logging.
    pub debug: bool,
    /// Enable HTTP debug logging.
    pub debug_http: bool,
}
