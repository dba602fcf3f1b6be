//! CLI command definitions and dispatch.

pub mod plan;
pub mod run;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use strata_common::config::AmbientConfig;
use strata_sdk::local_settings::load_local_settings;

/// Strata: configuration-driven composition runtime.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Overlay environment variables carrying this prefix onto the configuration.
    #[arg(long, global = true, env = "STRATA_ENV_PREFIX")]
    pub env_prefix: Option<String>,

    /// Development `KEY=VALUE` settings file applied over the configuration.
    #[arg(long, global = true)]
    pub local_settings: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display the module tree in build order without constructing anything.
    Plan(plan::PlanArgs),
    /// Compose the application and invoke its manager.
    Run(run::RunArgs),
}

/// Where the ambient configuration comes from besides the config file.
#[derive(Debug, Default)]
pub struct ConfigSources {
    env_prefix: Option<String>,
    local_settings: Option<PathBuf>,
}

impl ConfigSources {
    /// Reads `file`, then local settings, then the environment overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or if the local
    /// settings file exists but cannot be read.
    pub fn load(&self, file: &Path) -> anyhow::Result<AmbientConfig> {
        if !file.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file not found: {}\n\
                 Create an appsettings.json or specify a path: strata plan <file>",
                file.display()
            ));
        }
        let mut config = AmbientConfig::from_file(file)?;
        tracing::info!(file = %file.display(), "configuration loaded");

        if let Some(path) = &self.local_settings {
            let applied = load_local_settings(path, true, true, &mut config)?;
            tracing::info!(path = %path.display(), applied, "local settings applied");
        }
        if let Some(prefix) = &self.env_prefix {
            config = config.with_env_overlay(prefix);
        }
        Ok(config)
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let sources = ConfigSources {
        env_prefix: cli.env_prefix,
        local_settings: cli.local_settings,
    };
    match cli.command {
        Command::Plan(args) => plan::execute(&args, &sources),
        Command::Run(args) => run::execute(&args, &sources),
    }
}
