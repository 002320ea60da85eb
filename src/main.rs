use std::process::ExitCode;

use device_intervals::config::Config;
use device_intervals::handler::{run_events, RunSummary};
use device_intervals::logging::{init_tracing, LogConfig};
use device_intervals::store::Store;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(log_err) = init_tracing(&LogConfig::default()) {
                eprintln!("{log_err}");
            }
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&LogConfig::from(&config)) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    tracing::info!(table = %config.table_name, "Starting device-intervals");

    let store = match Store::open(&config.sled_path, &config.table_name) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, path = %config.sled_path, "Failed to open sled database");
            return ExitCode::FAILURE;
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let mut exit = ExitCode::SUCCESS;
    match run_events(stdin, &store, shutdown_signal()).await {
        Ok(summary) => {
            log_summary(&summary);
            if summary.failed > 0 {
                exit = ExitCode::FAILURE;
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read events from stdin");
            exit = ExitCode::FAILURE;
        }
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
        exit = ExitCode::FAILURE;
    }
    exit
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        processed = summary.processed,
        succeeded = summary.succeeded(),
        failed = summary.failed,
        interrupted = summary.interrupted,
        "Event stream finished"
    );
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
