//! Hands a resolved configuration to the agent pool.

use crate::config::Resolution;
use crate::error::{Error, Result};
use crate::pool::{AgentPool, AgentPoolRunner};

/// Starts the agent pool from a resolved configuration.
///
/// The pool is started exactly once; a failure is reported, not retried.
///
/// # Examples
///
/// ```no_run
/// use buildkite_agent::config::ConfigBuilder;
/// use buildkite_agent::{Bootstrap, ProcessPool};
///
/// let resolution = ConfigBuilder::new().build().unwrap();
/// Bootstrap::new(&ProcessPool::default()).run(&resolution).unwrap();
/// ```
pub struct Bootstrap<'a, R: AgentPoolRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: AgentPoolRunner + ?Sized> Bootstrap<'a, R> {
    /// Orchestrator using `runner`.
    #[must_use]
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Build the pool record and block in the pool's `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Start`] carrying the pool's message verbatim.
    pub fn run(&self, resolution: &Resolution) -> Result<()> {
        let pool = AgentPool::from_config(&resolution.config, resolution.config_file.as_deref());

        match &pool.config_file_path {
            Some(path) => log::info!("Starting agent with configuration file {}", path.display()),
            None => log::info!("Starting agent without a configuration file"),
        }

        self.runner.start(&pool).map_err(|e| Error::Start {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedConfig;
    use crate::pool::{MockAgentPoolRunner, PoolError};
    use mockall::predicate::function;
    use std::path::PathBuf;

    fn resolution() -> Resolution {
        Resolution {
            config: ResolvedConfig {
                token: "abc".into(),
                no_pty: true,
                ..ResolvedConfig::default()
            },
            config_file: Some(PathBuf::from("/etc/buildkite-agent/buildkite-agent.cfg")),
        }
    }

    #[test]
    fn test_start_called_once_with_record() {
        let mut runner = MockAgentPoolRunner::new();
        runner
            .expect_start()
            .with(function(|pool: &AgentPool| {
                pool.token == "abc"
                    && !pool.agent_configuration.run_in_pty
                    && pool.config_file_path.is_some()
            }))
            .times(1)
            .returning(|_| Ok(()));

        Bootstrap::new(&runner).run(&resolution()).unwrap();
    }

    #[test]
    fn test_failure_message_is_verbatim() {
        let mut runner = MockAgentPoolRunner::new();
        runner
            .expect_start()
            .times(1)
            .returning(|_| Err(PoolError::Other("could not register agent".into())));

        let err = Bootstrap::new(&runner).run(&resolution()).unwrap_err();
        match err {
            Error::Start { message } => assert_eq!(message, "could not register agent"),
            other => panic!("expected start error, got {other:?}"),
        }
    }

    #[test]
    fn test_works_with_trait_objects() {
        let mut runner = MockAgentPoolRunner::new();
        runner.expect_start().times(1).returning(|_| Ok(()));
        let runner: &dyn AgentPoolRunner = &runner;

        Bootstrap::new(runner).run(&resolution()).unwrap();
    }
}
