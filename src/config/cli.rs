//! Command line flags with environment fallbacks
//!
//! Every flag is optional; a provided value (flag first, then environment)
//! overrides the file or built-in default.

use super::models::{AgentConfig, ServerConfig};
use clap::Parser;
use std::path::PathBuf;

/// Metric collector server
#[derive(Debug, Default, Parser)]
#[command(name = "metric-server", about = "Metric collector server", version)]
pub struct ServerArgs {
    /// YAML configuration file
    #[arg(short = 'c', long = "config", env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address, host:port
    #[arg(short = 'a', long, env = "ADDRESS")]
    pub address: Option<String>,

    /// Snapshot interval in seconds (0 saves on every write)
    #[arg(short = 'i', long, env = "STORE_INTERVAL")]
    pub store_interval: Option<u64>,

    /// Snapshot file (empty disables file persistence)
    #[arg(short = 'f', long, env = "STORE_FILE")]
    pub store_file: Option<String>,

    /// Load the snapshot on startup
    #[arg(short = 'r', long, env = "RESTORE", action = clap::ArgAction::Set)]
    pub restore: Option<bool>,

    /// Shared HMAC key
    #[arg(short = 'k', long, env = "KEY")]
    pub key: Option<String>,

    /// Database URL; selects relational storage
    #[arg(short = 'd', long = "database-dsn", env = "DATABASE_DSN")]
    pub database_dsn: Option<String>,

    /// PEM private key for encrypted payloads
    #[arg(long = "crypto-key", env = "CRYPTO_KEY")]
    pub crypto_key: Option<String>,
}

impl ServerArgs {
    /// Overlay provided values onto `config`
    pub fn apply(self, config: &mut ServerConfig) {
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(interval) = self.store_interval {
            config.store_interval = interval;
        }
        if let Some(file) = self.store_file {
            config.store_file = file;
        }
        if let Some(restore) = self.restore {
            config.restore = restore;
        }
        if let Some(key) = self.key {
            config.key = Some(key);
        }
        if let Some(dsn) = self.database_dsn {
            config.database.url = dsn;
        }
        if let Some(crypto_key) = self.crypto_key {
            config.crypto_key = Some(crypto_key);
        }
    }
}

/// Metric sampling agent
#[derive(Debug, Default, Parser)]
#[command(name = "metric-agent", about = "Metric sampling agent", version)]
pub struct AgentArgs {
    /// YAML configuration file
    #[arg(short = 'c', long = "config", env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Collector address, host:port
    #[arg(short = 'a', long, env = "ADDRESS")]
    pub address: Option<String>,

    /// Push cadence in seconds
    #[arg(short = 'r', long, env = "REPORT_INTERVAL")]
    pub report_interval: Option<u64>,

    /// Sampling cadence in seconds
    #[arg(short = 'p', long, env = "POLL_INTERVAL")]
    pub poll_interval: Option<u64>,

    /// Shared HMAC key
    #[arg(short = 'k', long, env = "KEY")]
    pub key: Option<String>,

    /// PEM public key of the collector
    #[arg(long = "crypto-key", env = "CRYPTO_KEY")]
    pub crypto_key: Option<String>,

    /// PEM trust anchor for https delivery
    #[arg(long = "ca-file", env = "CA_FILE")]
    pub ca_file: Option<String>,
}

impl AgentArgs {
    /// Overlay provided values onto `config`
    pub fn apply(self, config: &mut AgentConfig) {
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(interval) = self.report_interval {
            config.report_interval = interval;
        }
        if let Some(interval) = self.poll_interval {
            config.poll_interval = interval;
        }
        if let Some(key) = self.key {
            config.key = Some(key);
        }
        if let Some(crypto_key) = self.crypto_key {
            config.crypto_key = Some(crypto_key);
        }
        if let Some(ca_file) = self.ca_file {
            config.ca_file = Some(ca_file);
        }
    }
}
