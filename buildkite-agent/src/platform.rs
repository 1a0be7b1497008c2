//! Host platform detection.

use std::fmt;

/// The operating system family the agent runs on.
///
/// Configuration behaves differently per family: candidate file locations
/// differ, and pseudo terminals are only available on Unix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux, macOS and other Unix-likes.
    Unix,
    /// Microsoft Windows.
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Whether jobs can be run inside a pseudo terminal.
    #[must_use]
    pub const fn supports_pty(self) -> bool {
        matches!(self, Self::Unix)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix => write!(f, "unix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}
