//! Collector server configuration

use super::*;
use crate::utils::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Collector server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port`
    #[serde(default = "default_address")]
    pub address: String,
    /// Snapshot interval in seconds; 0 saves on every write
    #[serde(default = "default_store_interval")]
    pub store_interval: u64,
    /// Snapshot file; empty disables file persistence
    #[serde(default = "default_store_file")]
    pub store_file: String,
    /// Load the snapshot on startup
    #[serde(default = "default_restore")]
    pub restore: bool,
    /// Shared HMAC key
    #[serde(default)]
    pub key: Option<String>,
    /// PEM private key used to decrypt agent payloads
    #[serde(default)]
    pub crypto_key: Option<String>,
    /// Number of worker threads
    #[serde(default)]
    pub workers: Option<usize>,
    /// Grace period for in-flight requests on shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Relational storage
    #[serde(default)]
    pub database: DatabaseConfig,
    /// TLS configuration
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            store_interval: default_store_interval(),
            store_file: default_store_file(),
            restore: default_restore(),
            key: None,
            crypto_key: None,
            workers: None,
            shutdown_timeout: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
            database: DatabaseConfig::default(),
            tls: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Shared key, if a non-empty one is configured
    pub fn signing_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_address(&self.address)?;

        if self.max_body_size == 0 {
            return Err("Max body size cannot be 0".to_string());
        }

        if self.workers == Some(0) {
            return Err("Workers cannot be 0".to_string());
        }

        self.database.validate()?;

        if let Some(tls) = &self.tls {
            tls.validate()?;
        }

        Ok(())
    }
}

/// TLS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Certificate chain file path (PEM)
    pub cert_file: String,
    /// Private key file path (PEM)
    pub key_file: String,
}

impl TlsConfig {
    /// Validate TLS configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cert_file.is_empty() {
            return Err("TLS certificate file path is required".to_string());
        }

        if self.key_file.is_empty() {
            return Err("TLS private key file path is required".to_string());
        }

        Ok(())
    }
}
