//! Candidate configuration file locations.
//!
//! The candidate list is a pure function of the platform, the directory
//! holding the running executable, and the environment. Callers that want the
//! live process state use [`default_candidate_paths`].

use std::env;
use std::path::{Path, PathBuf};

use crate::config::environment::EnvVars;
use crate::config::normalize::{expand_vars, resolve_components};
use crate::platform::Platform;

/// File name searched for in every candidate directory.
pub const CONFIG_FILE_NAME: &str = "buildkite-agent.cfg";

const UNIX_TEMPLATES: &[&str] = &[
    "$HOME/.buildkite-agent/buildkite-agent.cfg",
    "/usr/local/etc/buildkite-agent/buildkite-agent.cfg",
    "/etc/buildkite-agent/buildkite-agent.cfg",
];

const WINDOWS_TEMPLATES: &[&str] =
    &["$USERPROFILE\\AppData\\Local\\BuildkiteAgent\\buildkite-agent.cfg"];

/// Candidate configuration files, highest priority first.
///
/// When `exe_dir` is known, `<exe_dir>/buildkite-agent.cfg` comes first.
/// Variables in the platform templates expand against `env`; unset variables
/// expand to the empty string.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{candidate_paths, EnvVars};
/// use buildkite_agent::Platform;
/// use std::path::{Path, PathBuf};
///
/// let env: EnvVars = [("HOME", "/home/ci")].into_iter().collect();
/// let paths = candidate_paths(Platform::Unix, Some(Path::new("/opt/agent")), &env);
///
/// assert_eq!(paths[0], PathBuf::from("/opt/agent/buildkite-agent.cfg"));
/// assert_eq!(
///     paths[1],
///     PathBuf::from("/home/ci/.buildkite-agent/buildkite-agent.cfg")
/// );
/// assert_eq!(paths.len(), 4);
/// ```
#[must_use]
pub fn candidate_paths(platform: Platform, exe_dir: Option<&Path>, env: &EnvVars) -> Vec<PathBuf> {
    let templates = match platform {
        Platform::Unix => UNIX_TEMPLATES,
        Platform::Windows => WINDOWS_TEMPLATES,
    };

    exe_dir
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .into_iter()
        .chain(
            templates
                .iter()
                .map(|template| PathBuf::from(expand_vars(template, env))),
        )
        .collect()
}

/// Directory the agent was invoked from, if it can be determined.
///
/// Taken from the program path the process was started with, made absolute
/// against the working directory. Symlinks are not followed, so a linked
/// install searches next to the link rather than its target.
#[must_use]
pub fn executable_dir() -> Option<PathBuf> {
    match env::args_os().next() {
        Some(program) => {
            let working_dir = env::current_dir().ok()?;
            Some(invocation_dir(Path::new(&program), &working_dir))
        }
        None => env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf)),
    }
}

/// Absolute directory part of `program`. A bare name resolves to
/// `working_dir`.
fn invocation_dir(program: &Path, working_dir: &Path) -> PathBuf {
    let dir = program
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    resolve_components(&working_dir.join(dir))
}

/// Candidate paths for the current platform, executable and environment.
#[must_use]
pub fn default_candidate_paths() -> Vec<PathBuf> {
    candidate_paths(
        Platform::current(),
        executable_dir().as_deref(),
        &EnvVars::from_process(),
    )
}
