mod commands;
mod config;
mod roadmap;
mod service;
mod session;

use clap::Parser;
use tracing::debug;

use commands::Commands;
use config::Config;

/// Generate and browse research roadmaps from the ShikshaShakti roadmap service.
#[derive(Parser)]
#[command(name = "roadmap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load env
    let _ = dotenv::dotenv();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();
    debug!(backend = %config.backend_url, timeout = ?config.timeout, "configuration loaded");

    if let Err(e) = commands::run(cli.command, &config).await {
        debug!(error = ?e, "command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
