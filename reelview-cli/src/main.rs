//! Reelview CLI - Command-line interface
//!
//! Browse TMDB listings, search and title details from the terminal.

mod commands;
mod output;

use std::path::PathBuf;

use clap::Parser;
use reelview_core::tracing_setup::{CliLogLevel, init_tracing};
use reelview_core::{ReelviewConfig, ReelviewError};

#[derive(Parser)]
#[command(name = "reelview")]
#[command(about = "Browse movies and TV shows from The Movie Database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level (RUST_LOG overrides it)
    #[arg(long, global = true, default_value_t = CliLogLevel::default())]
    log_level: CliLogLevel,

    /// Directory for the per-run log file
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// TMDB API key, takes precedence over config and environment
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Serve canned data instead of calling the API
    #[arg(long, global = true)]
    offline: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(error) = run(cli).await {
        match error.downcast_ref::<ReelviewError>() {
            Some(e) => {
                tracing::debug!(error = %e, "Command failed");
                eprintln!("Error: {}", e.user_message());
            }
            None => eprintln!("Error: {error:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ReelviewConfig::load(cli.config.as_deref()).map_err(ReelviewError::from)?;
    if let Some(api_key) = cli.api_key {
        config.api.api_key = Some(api_key);
    }

    let context = commands::Context {
        config,
        json: cli.json,
        offline: cli.offline,
    };
    commands::handle_command(cli.command, &context).await
}
