//! # strata — composition runtime CLI
//!
//! Plans and runs applications composed from an `Architecture` manifest.
//! Single binary hosting the bundled demo catalog.

mod commands;
mod demo;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    commands::execute(cli)
}
