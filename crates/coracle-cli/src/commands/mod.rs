//! CLI command definitions and dispatch.

pub mod run;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Coracle — minimal single-container launcher.
#[derive(Parser, Debug)]
#[command(name = "coracle", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command inside a fresh container.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Run(args) => run::execute(args),
    }
}
