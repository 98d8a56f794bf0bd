use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use uptime_monitor::config::Config;
use uptime_monitor::engine::Monitor;
use uptime_monitor::notifier::Notifier;
use uptime_monitor::state::StatusBoard;
use uptime_monitor::{api, logging};

#[derive(Parser)]
#[command(name = "uptime-monitor", about = "Uptime Monitor CLI Tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the uptime monitor service.
    Start {
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,
    },
    /// Display the version.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Start { config } => start(config).await,
        Command::Version => {
            println!("Uptime Monitor version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn start(config_path: PathBuf) -> Result<()> {
    let config = Config::load_from_file(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    logging::init(&config.log_dir, config.log_retention_days)?;

    let notifier = Arc::new(Notifier::new(config.telegram_credentials())?);
    let state = Arc::new(StatusBoard::new());
    let monitor = Arc::new(Monitor::from_config(&config, notifier, Arc::clone(&state))?);

    let host = config.status_api.host.clone();
    let port = config.status_api.port;
    let state_for_api = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = api::start_server(&host, port, state_for_api).await {
            error!("Status server failed: {:#}", e);
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_task = tokio::spawn(Arc::clone(&monitor).run(shutdown_rx));

    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping monitor...");
    let _ = shutdown_tx.send(true);

    match monitor_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Monitor engine failed: {:#}", e),
        Err(e) => error!("Monitor task panicked: {}", e),
    }
    info!("Service stopped by user.");

    Ok(())
}
