//! Agent configuration

use super::*;
use crate::utils::error::RetryConfig;
use crate::utils::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Collector address, `host:port`
    #[serde(default = "default_address")]
    pub address: String,
    /// Push cadence in seconds
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
    /// Sampling cadence in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Shared HMAC key
    #[serde(default)]
    pub key: Option<String>,
    /// PEM public key of the collector; enables payload encryption
    #[serde(default)]
    pub crypto_key: Option<String>,
    /// PEM trust anchor; switches delivery to https
    #[serde(default)]
    pub ca_file: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Delivery retries
    #[serde(default)]
    pub retry: RetrySettings,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            report_interval: default_report_interval(),
            poll_interval: default_poll_interval(),
            key: None,
            crypto_key: None,
            ca_file: None,
            request_timeout: default_request_timeout(),
            retry: RetrySettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Shared key, if a non-empty one is configured
    pub fn signing_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn report_period(&self) -> Duration {
        Duration::from_secs(self.report_interval)
    }

    /// Validate agent configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_address(&self.address)?;

        if self.poll_interval == 0 {
            return Err("Poll interval cannot be 0".to_string());
        }
        if self.report_interval == 0 {
            return Err("Report interval cannot be 0".to_string());
        }
        if self.request_timeout == 0 {
            return Err("Request timeout cannot be 0".to_string());
        }

        self.retry.validate()
    }
}

/// Delivery retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per batch
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First wait in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Wait cap in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetrySettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Retry max_attempts cannot be 0".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("Retry backoff_multiplier must be at least 1.0".to_string());
        }
        Ok(())
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig {
            max_attempts: settings.max_attempts,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
            jitter: false,
        }
    }
}
