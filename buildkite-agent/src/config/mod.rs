//! Configuration system for `agent start`.
//!
//! Configuration comes from three sources, merged per field with the
//! following precedence (highest to lowest):
//!
//! 1. Command-line flags
//! 2. Environment variables (`BUILDKITE_*`)
//! 3. The first existing configuration file (`buildkite-agent.cfg`)
//! 4. Built-in defaults
//!
//! All sources agree on names and types through a single immutable
//! [`Schema`]. Each source produces a [`ConfigLayer`] holding only the values
//! it explicitly set, so an explicit `false` or empty string still overrides
//! lower sources.
//!
//! # Examples
//!
//! Resolving with a synthetic environment:
//!
//! ```
//! use buildkite_agent::config::{ConfigBuilder, EnvVars};
//!
//! let env: EnvVars = [
//!     ("BUILDKITE_AGENT_TOKEN", "abc"),
//!     ("BUILDKITE_BUILD_PATH", "/var/lib/buildkite/builds"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let resolution = ConfigBuilder::new().with_env(env).skip_files().build().unwrap();
//! assert_eq!(resolution.config.token, "abc");
//! assert!(resolution.config.build_path.is_absolute());
//! ```

pub mod arguments;
pub mod builder;
pub mod environment;
pub mod layer;
pub mod loader;
pub mod merger;
pub mod normalize;
pub mod paths;
pub mod policy;
pub mod resolved;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

pub use arguments::CommandLineConfig;
pub use builder::{ConfigBuilder, Resolution, CONFIG_ENV_VAR};
pub use environment::{EnvVars, EnvironmentConfig};
pub use layer::{ConfigLayer, Source};
pub use loader::{ConfigFile, ConfigLoader};
pub use merger::ConfigMerger;
pub use normalize::{expand_tilde, expand_vars, resolve_components, Normalizer};
pub use paths::{candidate_paths, default_candidate_paths, executable_dir, CONFIG_FILE_NAME};
pub use policy::PlatformPolicy;
pub use resolved::ResolvedConfig;
pub use schema::{
    parse_bool, parse_list, DefaultValue, Field, FieldKind, FieldSpec, Schema, Value,
    DEFAULT_BOOTSTRAP_SCRIPT, DEFAULT_DISCONNECT_AFTER_JOB_TIMEOUT, DEFAULT_ENDPOINT,
};
pub use validator::{ConfigValidator, MIN_DISCONNECT_AFTER_JOB_TIMEOUT};
