//! Configuration validation.
//!
//! Validation reports the first violation only. Required fields are checked
//! right after normalization; cross-field constraints run after the platform
//! policy so an override can never invalidate them.

use std::path::Path;

use crate::config::resolved::ResolvedConfig;
use crate::error::{Error, Result};

/// Minimum wait, in seconds, for a job when disconnecting after one.
pub const MIN_DISCONNECT_AFTER_JOB_TIMEOUT: u64 = 120;

/// Validates a merged configuration.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{ConfigValidator, ResolvedConfig};
///
/// let config = ResolvedConfig {
///     token: "abc".into(),
///     bootstrap_script: "/usr/bin/bootstrap".into(),
///     build_path: "/var/builds".into(),
///     endpoint: "https://agent.buildkite.com/v3".into(),
///     disconnect_after_job_timeout: 120,
///     ..ResolvedConfig::default()
/// };
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run every check in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Validation`] encountered.
    pub fn validate(config: &ResolvedConfig) -> Result<()> {
        Self::validate_required(config)?;
        Self::validate_constraints(config)
    }

    /// Check that token, bootstrap-script, build-path and endpoint are set.
    ///
    /// Whitespace-only values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first missing field.
    pub fn validate_required(config: &ResolvedConfig) -> Result<()> {
        Self::require_string("token", &config.token)?;
        Self::require_path("bootstrap-script", &config.bootstrap_script)?;
        Self::require_path("build-path", &config.build_path)?;
        Self::require_string("endpoint", &config.endpoint)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on `disconnect-after-job-timeout` if
    /// `disconnect-after-job` is set and the timeout is below
    /// [`MIN_DISCONNECT_AFTER_JOB_TIMEOUT`].
    pub fn validate_constraints(config: &ResolvedConfig) -> Result<()> {
        if config.disconnect_after_job
            && config.disconnect_after_job_timeout < MIN_DISCONNECT_AFTER_JOB_TIMEOUT
        {
            return Err(Error::validation(
                "disconnect-after-job-timeout",
                format!(
                    "the timeout must be at least {MIN_DISCONNECT_AFTER_JOB_TIMEOUT} seconds when \
                     disconnect-after-job is enabled (got {})",
                    config.disconnect_after_job_timeout
                ),
            ));
        }

        Ok(())
    }

    fn require_string(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::validation(field, "a value is required"));
        }
        Ok(())
    }

    fn require_path(field: &str, value: &Path) -> Result<()> {
        Self::require_string(field, &value.to_string_lossy())
    }
}
