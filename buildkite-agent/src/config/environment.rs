//! Environment variable handling for configuration overrides.
//!
//! This module reads the `BUILDKITE_*` environment variables named by the
//! schema into a [`ConfigLayer`]. The environment is captured once into an
//! [`EnvVars`] snapshot so the rest of the pipeline never reads process state
//! directly.

use std::collections::HashMap;
use std::env;

use crate::config::layer::{ConfigLayer, Source};
use crate::config::schema::Schema;
use crate::error::Result;

/// Snapshot of environment variables.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::EnvVars;
///
/// let vars: EnvVars = [("BUILDKITE_AGENT_TOKEN", "abc")].into_iter().collect();
/// assert_eq!(vars.get("BUILDKITE_AGENT_TOKEN"), Some("abc"));
/// assert_eq!(vars.get("HOME"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// The value of `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The value of `key`, treating empty or whitespace-only values as unset.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Builds the environment layer.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{EnvVars, EnvironmentConfig, Field, Schema, Value};
///
/// let vars: EnvVars = [("BUILDKITE_NO_PTY", "true")].into_iter().collect();
/// let layer = EnvironmentConfig::layer(&Schema::agent_start(), &vars).unwrap();
/// assert_eq!(layer.get(Field::NoPty), Some(&Value::Bool(true)));
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Read every schema field's environment variable from `vars`.
    ///
    /// Empty values are treated as unset. Lists are comma-separated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) naming the variable if a
    /// boolean or integer value is invalid.
    pub fn layer(schema: &Schema, vars: &EnvVars) -> Result<ConfigLayer> {
        let mut layer = ConfigLayer::new(Source::Environment);

        for spec in schema.fields() {
            if let Some(raw) = vars.get_non_empty(spec.env_var) {
                let value = spec.kind.parse(spec.env_var, raw)?;
                log::debug!("{} set from {}", spec.key, spec.env_var);
                layer.set(spec.field, value);
            }
        }

        Ok(layer)
    }
}
