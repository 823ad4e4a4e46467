//! Storage configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Database configuration. An empty URL keeps metrics in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (`postgres://..` or `sqlite:..`)
    #[serde(default)]
    pub url: String,
    /// Maximum connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the relational backend is selected
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.is_enabled() && self.max_connections == 0 {
            return Err("Database max_connections cannot be 0".to_string());
        }
        Ok(())
    }
}
