use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cstat_cli::commands::{report, series};
use cstat_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Report {
            files,
            window,
            from,
            to,
            json,
        } => {
            let selection = window.to_selection(from, to)?;
            report::run(&mut out, &files, &selection, json, &config)?;
        }
        Commands::Series {
            files,
            window,
            from,
            to,
            combined,
        } => {
            let selection = window.to_selection(from, to)?;
            series::run(&mut out, &files, &selection, combined, &config)?;
        }
    }

    Ok(())
}
