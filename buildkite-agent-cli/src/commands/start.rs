//! Command to configure and start the agent pool.

use crate::error::CliError;
use buildkite_agent::config::{CommandLineConfig, ConfigBuilder, ConfigLayer, Field, Schema};
use buildkite_agent::{init_logger, AgentPool, Bootstrap, ProcessPool};
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Args, FromArgMatches};
use std::path::PathBuf;

/// Start a Buildkite agent.
///
/// The agent flags are generated from [`Schema::agent_start`], so this type
/// implements [`Args`] by hand instead of deriving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCommand {
    /// Explicit configuration file (replaces the candidate search).
    pub config: Option<PathBuf>,

    /// Executable that runs the agent pool.
    pub pool_command: PathBuf,

    /// Print the pool record instead of starting the pool.
    pub dry_run: bool,

    /// Agent settings typed on the command line.
    pub settings: ConfigLayer,
}

impl StartCommand {
    /// Resolve the configuration and start the agent pool.
    ///
    /// Logging is installed first from the `debug` and `no-color` values on
    /// the command line or in the environment, so resolution itself can be
    /// traced, and is then switched to the resolved values.
    ///
    /// With `--dry-run` the pool record is printed as JSON instead.
    pub fn execute(self) -> Result<(), CliError> {
        let builder = ConfigBuilder::new()
            .with_command_line(self.settings)
            .with_config_file(self.config);

        let logger = init_logger(
            builder.preliminary_bool(Field::Debug),
            builder.preliminary_bool(Field::NoColor),
        );
        // Fails only when another logger is already installed; keep that one.
        let logger = logger.install().ok();

        let resolution = builder.build()?;
        let config = &resolution.config;
        if let Some(logger) = logger {
            logger.configure(config.debug, config.no_color);
        }

        if self.dry_run {
            let pool = AgentPool::from_config(config, resolution.config_file.as_deref());
            println!("{}", serde_json::to_string_pretty(&pool)?);
            return Ok(());
        }

        let runner = ProcessPool::new(self.pool_command);
        Bootstrap::new(&runner).run(&resolution)?;
        Ok(())
    }
}

impl FromArgMatches for StartCommand {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let settings = CommandLineConfig::from_matches(&Schema::agent_start(), matches)
            .map_err(|e| clap::Error::raw(ErrorKind::ValueValidation, format!("{e}\n")))?;

        Ok(Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            pool_command: matches
                .get_one::<PathBuf>("pool-command")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(ProcessPool::DEFAULT_PROGRAM)),
            dry_run: matches.get_flag("dry-run"),
            settings,
        })
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        let update = Self::from_arg_matches(matches)?;
        if update.config.is_some() {
            self.config = update.config;
        }
        self.pool_command = update.pool_command;
        self.dry_run |= update.dry_run;
        for (field, value) in update.settings.iter() {
            self.settings.set(field, value.clone());
        }
        Ok(())
    }
}

impl Args for StartCommand {
    fn augment_args(cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path to a configuration file [env: BUILDKITE_AGENT_CONFIG]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("pool-command")
                .long("pool-command")
                .value_name("PROGRAM")
                .help("Executable that runs the agent pool")
                .env("BUILDKITE_AGENT_POOL_COMMAND")
                .default_value(ProcessPool::DEFAULT_PROGRAM)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the resolved agent pool configuration as JSON and exit")
                .action(ArgAction::SetTrue),
        )
        .args(CommandLineConfig::args(&Schema::agent_start()))
    }

    fn augment_args_for_update(cmd: clap::Command) -> clap::Command {
        Self::augment_args(cmd)
    }
}
