//! CLI structure and command definitions.
//!
//! The top level uses clap's derive macros. The `start` flags are generated
//! from the library's configuration schema, see [`StartCommand`].

use crate::commands::StartCommand;
use clap::{Parser, Subcommand};

/// Long description shown by `buildkite-agent start --help`.
pub const START_DESCRIPTION: &str = "\
When a job is ready to run it will call the \"bootstrap-script\" and pass it \
all the environment variables required for the job to run. This script is \
responsible for checking out the code, and running the actual build script \
defined in the pipeline.

The agent will run any jobs within a PTY (pseudo terminal) if available.

Example:

   $ buildkite-agent start --token xxx";

/// Configure and start a Buildkite agent.
#[derive(Parser)]
#[command(name = "buildkite-agent")]
#[command(version, about = "Configure and start a Buildkite agent", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Starts a Buildkite agent
    #[command(long_about = START_DESCRIPTION)]
    Start(StartCommand),
}
