pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let fallback = if cli.verbose {
        "calmora=debug,tower_http=debug"
    } else {
        config::default_log_filter()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    cli::execute(cli)
}
