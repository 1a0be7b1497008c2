//! CLI-specific error types with exit codes.
//!
//! This module wraps library errors and maps each class of failure to its
//! own exit code.

use buildkite_agent::Error as LibError;
use std::fmt;

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// I/O error.
    Io(std::io::Error),

    /// The pool record could not be rendered.
    Serialization(serde_json::Error),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: The agent pool failed to start
    /// - 2: Invalid command-line usage (reported by clap)
    /// - 3: A configuration file could not be read
    /// - 4: A configuration value could not be parsed
    /// - 5: The configuration is invalid
    /// - 6: I/O or serialization error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Library(lib_err) => match lib_err {
                LibError::Start { .. } => 1,
                LibError::Discovery { .. } => 3,
                LibError::Parse { .. } => 4,
                LibError::Validation { .. } => 5,
                LibError::Io(_) => 6,
            },
            CliError::Io(_) | CliError::Serialization(_) => 6,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Serialization(e) => write!(f, "could not render agent pool: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Serialization(e) => Some(e),
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        CliError::Library(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e)
    }
}
