//! Platform-specific overrides applied after merging.

use crate::config::resolved::ResolvedConfig;
use crate::platform::Platform;

/// Forces settings the host platform cannot honour.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{PlatformPolicy, ResolvedConfig};
/// use buildkite_agent::Platform;
///
/// let config = ResolvedConfig { no_pty: false, ..ResolvedConfig::default() };
///
/// assert!(PlatformPolicy::new(Platform::Windows).apply(config.clone()).no_pty);
/// assert!(!PlatformPolicy::new(Platform::Unix).apply(config).no_pty);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPolicy {
    platform: Platform,
}

impl PlatformPolicy {
    /// Policy for `platform`.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Policy for the platform this binary runs on.
    #[must_use]
    pub const fn current() -> Self {
        Self::new(Platform::current())
    }

    /// The platform this policy applies.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Apply the overrides. Fields the platform supports are left untouched.
    #[must_use]
    pub fn apply(&self, mut config: ResolvedConfig) -> ResolvedConfig {
        if !self.platform.supports_pty() && !config.no_pty {
            log::debug!("PTY is not supported on {}, forcing no-pty", self.platform);
            config.no_pty = true;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_forces_no_pty() {
        let config = PlatformPolicy::new(Platform::Windows).apply(ResolvedConfig::default());
        assert!(config.no_pty);
    }

    #[test]
    fn test_unix_leaves_config_unchanged() {
        for no_pty in [true, false] {
            let config = ResolvedConfig {
                no_pty,
                name: "agent".into(),
                ..ResolvedConfig::default()
            };
            assert_eq!(PlatformPolicy::new(Platform::Unix).apply(config.clone()), config);
        }
    }

    #[test]
    fn test_windows_only_touches_no_pty() {
        let config = ResolvedConfig {
            debug: true,
            disconnect_after_job_timeout: 300,
            ..ResolvedConfig::default()
        };
        let applied = PlatformPolicy::new(Platform::Windows).apply(config.clone());
        assert_eq!(
            applied,
            ResolvedConfig {
                no_pty: true,
                ..config
            }
        );
    }
}
