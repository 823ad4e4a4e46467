//! Server entry point

use crate::config::ServerConfig;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

/// Build the collector from configuration and serve until a signal arrives
pub async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting metric collector");
    info!("   POST /update, /update/{{kind}}/{{name}}/{{value}}, /updates");
    info!("   GET  /, /value/{{kind}}/{{name}}, /ping");
    info!("   POST /value");

    let server = HttpServer::new(&config).await?;
    server.start().await
}
