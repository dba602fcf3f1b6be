//! `strata plan` — Display the module tree before composing anything.

use std::path::PathBuf;

use clap::Args;
use strata_common::constants::DEFAULT_CONFIG_FILE;
use strata_sdk::architecture::AppArchitecture;

use super::ConfigSources;
use crate::{demo, output};

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the configuration file holding the `Architecture` section.
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    pub file: PathBuf,
}

/// Executes the `plan` command.
///
/// Loads the manifest, resolves each contract's archetype, checks every
/// edge against the archetype policy, and prints the modules in build
/// order with their lifetimes, sources, and effective behaviors.
///
/// # Errors
///
/// Returns an error if loading, resolution, or policy validation fails.
pub fn execute(args: &PlanArgs, sources: &ConfigSources) -> anyhow::Result<()> {
    let config = sources.load(&args.file)?;
    let registry = demo::registry();
    let shared = demo::shared_services();
    let architecture = AppArchitecture::new(&registry, &shared, &config);

    let manifest = architecture.load()?;
    let graph = architecture.plan_spec(&manifest)?;
    let order = graph.resolve_order()?;

    println!("Composition Plan for: {}", args.file.display());
    println!("{}", output::rule(35));
    println!();

    for node in &order {
        println!("  + {}", output::module_line(node));
        let Some(module) = output::find_module(&manifest.modules, &node.path) else {
            continue;
        };
        if !module.implementation.library.is_empty() {
            println!("      library: {}", module.implementation.library);
        }
        for behavior in &module.behaviors {
            println!("      behavior: {}", output::behavior_line(behavior));
        }
    }

    println!();
    println!("  {} module(s) will be composed.", graph.module_count());

    if !manifest.global_behaviors.is_empty() {
        println!();
        println!("  Global behaviors:");
        for behavior in &manifest.global_behaviors {
            println!("    {}", output::behavior_line(behavior));
        }
    }

    Ok(())
}
