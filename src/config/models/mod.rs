//! Configuration data models
//!
//! Plain serde structs with per-field defaults. Every binary builds its
//! config once at startup and hands it to constructors.

#![allow(missing_docs)]

pub mod agent;
pub mod server;
pub mod storage;

pub use agent::*;
pub use server::*;
pub use storage::*;

/// Default collector address
pub fn default_address() -> String {
    "localhost:8080".to_string()
}

/// Default snapshot interval in seconds
pub fn default_store_interval() -> u64 {
    300
}

/// Default snapshot file
pub fn default_store_file() -> String {
    "/tmp/devops-metrics-db.json".to_string()
}

/// Restore the snapshot on startup by default
pub fn default_restore() -> bool {
    true
}

/// Default graceful shutdown window in seconds
pub fn default_shutdown_timeout() -> u64 {
    5
}

/// Default maximum request body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Default push cadence in seconds
pub fn default_report_interval() -> u64 {
    10
}

/// Default sampling cadence in seconds
pub fn default_poll_interval() -> u64 {
    2
}

/// Default agent request timeout in seconds
pub fn default_request_timeout() -> u64 {
    10
}

/// Default maximum delivery attempts
pub fn default_max_attempts() -> u32 {
    3
}

/// Default first retry wait in milliseconds
pub fn default_base_delay() -> u64 {
    2000
}

/// Default retry wait cap in milliseconds
pub fn default_max_delay() -> u64 {
    5000
}

/// Default backoff multiplier
pub fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Default pool size
pub fn default_max_connections() -> u32 {
    10
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Check that an address is `host:port` with a valid port
pub fn validate_address(address: &str) -> Result<(), String> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| format!("Address '{}' must be host:port", address))?;
    if host.is_empty() {
        return Err(format!("Address '{}' has an empty host", address));
    }
    port.parse::<u16>()
        .map_err(|_| format!("Address '{}' has an invalid port", address))?;
    Ok(())
}
