use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info};

use trend_relay::api::{start_api_server, AppState};
use trend_relay::cli::{Cli, Commands};
use trend_relay::config::AppConfig;
use trend_relay::error::{RelayError, Result};
use trend_relay::relay::Sweeper;

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple, shutdown_signal};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config_dir)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.clone().unwrap_or(Commands::Serve) {
        Commands::CheckConfig => {
            init_logging_simple();
            check_config(&config)
        }
        Commands::Serve => {
            init_logging(&config.logging);
            run_server(config).await
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    println!("{:#?}", config);
    match config.validate() {
        Ok(()) => {
            println!("\x1b[32mConfiguration OK\x1b[0m");
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                println!("\x1b[31m  - {}\x1b[0m", e);
            }
            Err(RelayError::InvalidArgument(format!(
                "{} configuration problem(s)",
                errors.len()
            )))
        }
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Invalid configuration: {}", e);
        }
        return Err(RelayError::InvalidArgument(errors.join("; ")));
    }

    info!(
        "Starting trend relay (signal ttl {}ms, force close reset {}ms, break-even timeout {}ms)",
        config.timing.trade_signal_ttl_ms,
        config.timing.force_close_reset_ms,
        config.timing.break_even_timeout_ms
    );

    let state = AppState::from_config(&config);

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let sweeper = Sweeper::new(state.relay.clone(), config.sweep.clone()).spawn(shutdown_rx);

    start_api_server(state, &config.server, shutdown_signal()).await?;

    info!("Shutting down sweeper...");
    let _ = shutdown_tx.send(());
    if let Err(e) = sweeper.await {
        error!("Sweeper task failed: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}
