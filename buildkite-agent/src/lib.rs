#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # buildkite-agent
//!
//! Configuration resolution and bootstrap for `buildkite-agent start`.
//!
//! This library gathers the agent's settings from command-line flags,
//! environment variables and an optional configuration file, merges them
//! under a fixed precedence, normalizes and validates the result, applies
//! platform policy, and hands the outcome to an external agent pool.
//!
//! ## Core Types
//!
//! - [`Schema`](config::Schema): the immutable catalog of fields
//! - [`ConfigBuilder`] and [`ResolvedConfig`]: configuration resolution
//! - [`AgentPool`] and [`AgentPoolRunner`]: the pool record and its runner
//! - [`Bootstrap`]: starts the pool from a resolved configuration
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use buildkite_agent::{AgentPool, ConfigBuilder};
//! use buildkite_agent::config::EnvVars;
//!
//! let env: EnvVars = [
//!     ("BUILDKITE_AGENT_TOKEN", "abc"),
//!     ("BUILDKITE_BUILD_PATH", "/var/lib/buildkite/builds"),
//!     ("BUILDKITE_NO_PTY", "true"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let resolution = ConfigBuilder::new().with_env(env).skip_files().build().unwrap();
//! let pool = AgentPool::from_config(&resolution.config, resolution.config_file.as_deref());
//! assert!(!pool.agent_configuration.run_in_pty);
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod pool;

// Re-export key types at crate root for convenience
pub use bootstrap::Bootstrap;
pub use config::{ConfigBuilder, Resolution, ResolvedConfig};
pub use error::{Error, Result};
pub use logging::{init_logger, Logger};
pub use platform::Platform;
pub use pool::{AgentConfiguration, AgentPool, AgentPoolRunner, PoolError, ProcessPool};
