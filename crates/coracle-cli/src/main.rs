//! # coracle — single-container launcher CLI
//!
//! Runs one command inside an isolated root filesystem built from a static
//! image: copy-on-write overlay plus mount and UTS namespace isolation.

mod commands;

use std::process::ExitCode;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
