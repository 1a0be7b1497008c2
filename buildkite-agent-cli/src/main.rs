//! Main entry point for the buildkite-agent CLI.
//!
//! The only command is `start`, which resolves the agent configuration from
//! flags, environment variables and a configuration file, then hands it to
//! the agent pool.

mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        cli::Command::Start(cmd) => cmd.execute(),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
