//! `strata run` — Compose the application and invoke its manager.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use strata_common::constants::DEFAULT_CONFIG_FILE;
use strata_sdk::architecture::add_app_architecture;
use strata_sdk::composition::Composition;

use super::ConfigSources;
use crate::demo::{self, ISvc1};
use crate::output;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the configuration file holding the `Architecture` section.
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    pub file: PathBuf,

    /// Number of times the manager is acquired and invoked.
    #[arg(short, long, default_value_t = 1)]
    pub repeat: usize,
}

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if composition fails or the manager contract is not
/// provided by a top-level module.
pub fn execute(args: &RunArgs, sources: &ConfigSources) -> anyhow::Result<()> {
    let started = Instant::now();
    print_header();

    let config = sources.load(&args.file)?;
    let registry = demo::registry();
    let shared = demo::shared_services();
    let composition = add_app_architecture(&registry, &shared, &config)?;
    report(&composition, started);

    for _ in 0..args.repeat {
        let manager = composition.acquire::<dyn ISvc1>()?;
        println!("{}", manager.do_something());
    }

    composition.dispose();
    eprintln!();
    eprintln!("  {GREEN}Composition disposed.{RESET}");
    Ok(())
}

fn print_header() {
    eprintln!();
    eprintln!("  {BOLD}Strata{RESET} {DIM}v{}{RESET}", env!("CARGO_PKG_VERSION"));
    eprintln!();
}

fn report(composition: &Composition, started: Instant) {
    eprintln!(
        "  {GREEN}{BOLD}Composed {}{RESET} module(s) in {}:",
        composition.module_count(),
        output::format_elapsed(started.elapsed())
    );
    eprintln!();
    for provider in composition.providers() {
        eprintln!(
            "    {GREEN}\u{25cf}{RESET} {BOLD}{}{RESET} {DIM}[{} as {}, {}]{RESET}",
            provider.logical_name(),
            provider.implementation().name(),
            provider.contract().name(),
            provider.lifetime()
        );
        for label in provider.behavior_labels() {
            eprintln!("        {DIM}{label}{RESET}");
        }
    }
    eprintln!();
}
