//! pulse CLI - website quality analysis with PageSpeed Insights
//!
//! This is the main entry point for the pulse command-line interface.
//! Command implementations live in separate modules under `commands`.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use pulse_core::Config;
use tracing::debug;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{CacheCommands, Cli, Commands, ConfigCommands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::initialize_logging(&cli)?;

    if let Err(err) = execute_command(cli).await {
        report_error(&err);
        std::process::exit(1);
    }
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    let core = err.downcast_ref::<pulse_core::Error>();
    let label = if core.is_some_and(pulse_core::Error::is_analysis_failure) {
        "Analysis failed:"
    } else {
        "Error:"
    };
    eprintln!("{} {err:#}", label.red().bold());

    if let Some(core) = core {
        debug!("Command failed with a {} error", core.category());
        if core.is_recoverable() {
            eprintln!("{}", "This may be temporary; try again in a moment.".dimmed());
        }
    }
}

async fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => commands::analyze(&load_config()?, &args).await?,
        Commands::Export(args) => commands::export(&load_config()?, &args).await?,
        Commands::Cache {
            command: CacheCommands::Clear { force },
        } => commands::clear_cache(&load_config()?, force)?,
        Commands::Config {
            command: ConfigCommands::Show,
        } => commands::show_config(&load_config()?)?,
        Commands::Config {
            command: ConfigCommands::Path,
        } => commands::config_path()?,
        Commands::Completions { shell } => commands::generate(shell, &mut std::io::stdout()),
    }

    Ok(())
}

fn load_config() -> Result<Config> {
    let config = Config::load()?;
    debug!(
        "Using endpoint {} and cache at {}",
        config.api.endpoint,
        config.cache.dir.display()
    );
    Ok(config)
}
