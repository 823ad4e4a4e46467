//! Metric collector server

use clap::Parser;
use metric_service::config::{ServerArgs, load_server_config};
use metric_service::server;
use metric_service::utils::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match load_server_config(ServerArgs::parse()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match server::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
