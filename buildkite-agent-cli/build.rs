//! Build script for buildkite-agent-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated pages are placed in OUT_DIR for inclusion in release builds.
//!
//! The `start` flags come from the library's schema, the same source the
//! binary uses, so the man page cannot drift from the real flags.

use buildkite_agent::config::{CommandLineConfig, Schema};
use buildkite_agent::ProcessPool;
use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the `start` subcommand.
///
/// IMPORTANT: Keep the non-schema flags synchronized with
/// src/commands/start.rs.
fn build_start() -> Command {
    Command::new("start")
        .about("Starts a Buildkite agent")
        .long_about(
            "When a job is ready to run it will call the \"bootstrap-script\" and pass it all \
             the environment variables required for the job to run. The agent will run any \
             jobs within a PTY (pseudo terminal) if available.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path to a configuration file [env: BUILDKITE_AGENT_CONFIG]"),
        )
        .arg(
            Arg::new("pool-command")
                .long("pool-command")
                .value_name("PROGRAM")
                .help("Executable that runs the agent pool")
                .env("BUILDKITE_AGENT_POOL_COMMAND")
                .default_value(ProcessPool::DEFAULT_PROGRAM),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the resolved agent pool configuration as JSON and exit")
                .action(ArgAction::SetTrue),
        )
        .args(CommandLineConfig::args(&Schema::agent_start()))
}

fn build_cli() -> Command {
    Command::new("buildkite-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Configure and start a Buildkite agent")
        .subcommand(build_start())
}

fn render(man_dir: &std::path::Path, name: &str, cmd: Command) {
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();
    fs::write(man_dir.join(format!("{name}.1")), buffer).unwrap();
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    render(&man_dir, "buildkite-agent", build_cli());
    render(
        &man_dir,
        "buildkite-agent-start",
        build_start().name("buildkite-agent-start"),
    );

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
