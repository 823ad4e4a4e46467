//! Configuration management
//!
//! Layering, lowest precedence first: built-in defaults, an optional YAML
//! file, then command line flags / environment variables.

pub mod cli;
pub mod models;

pub use cli::{AgentArgs, ServerArgs};
pub use models::*;

use crate::utils::error::{MetricError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// Load a YAML configuration file
pub async fn from_file<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MetricError::Config(format!("Failed to read config file: {}", e)))?;

    let config = serde_yaml::from_str(&content)
        .map_err(|e| MetricError::Config(format!("Failed to parse config: {}", e)))?;

    debug!("Configuration file parsed");
    Ok(config)
}

/// Build the server configuration from file and flags
pub async fn load_server_config(args: ServerArgs) -> Result<ServerConfig> {
    let mut config: ServerConfig = match &args.config {
        Some(path) => from_file(path).await?,
        None => ServerConfig::default(),
    };
    args.apply(&mut config);

    config
        .validate()
        .map_err(|e| MetricError::Config(format!("Server config error: {}", e)))?;
    Ok(config)
}

/// Build the agent configuration from file and flags
pub async fn load_agent_config(args: AgentArgs) -> Result<AgentConfig> {
    let mut config: AgentConfig = match &args.config {
        Some(path) => from_file(path).await?,
        None => AgentConfig::default(),
    };
    args.apply(&mut config);

    config
        .validate()
        .map_err(|e| MetricError::Config(format!("Agent config error: {}", e)))?;
    Ok(config)
}
