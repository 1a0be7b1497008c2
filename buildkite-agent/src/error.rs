//! Error types for the buildkite-agent library.
//!
//! Every error raised while resolving configuration or starting the agent
//! pool is terminal: callers surface the message once and exit.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an agent error.
///
/// # Examples
///
/// ```
/// use buildkite_agent::{Error, Result};
///
/// fn timeout() -> Result<u64> {
///     Ok(120)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the buildkite-agent library.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration file exists (or was explicitly requested) but could
    /// not be read.
    #[error("could not read configuration file {}: {source}", path.display())]
    Discovery {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration value could not be parsed into its declared type.
    #[error("failed to parse {origin}: {message}")]
    Parse {
        /// Where the offending value came from (flag, env var, or file and key).
        origin: String,
        /// A description of the parse failure.
        message: String,
    },

    /// A required field is missing or a constraint between fields is violated.
    #[error("invalid configuration for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The agent pool failed to start.
    #[error("{message}")]
    Start {
        /// The message reported by the agent pool, verbatim.
        message: String,
    },

    /// Process state needed for resolution (such as the working directory)
    /// could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parse error for a value coming from `origin`.
    pub(crate) fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Build a validation error for `field`.
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
