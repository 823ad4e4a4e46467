//! Error types for the metric pipeline

use thiserror::Error;

/// Result type alias for the metric pipeline
pub type Result<T> = std::result::Result<T, MetricError>;

/// Main error type shared by the agent, the ingestion service and storage
#[derive(Error, Debug)]
pub enum MetricError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed metric or request body
    #[error("Validation error: {0}")]
    Validation(String),

    /// Metric kind other than counter or gauge
    #[error("Unsupported metric type: {0}")]
    UnsupportedMetricType(String),

    /// Submitted hash does not match the locally computed one
    #[error("Hash mismatch for metric: {0}")]
    HashMismatch(String),

    /// Metric absent from storage
    #[error("Metric not found: {0}")]
    NotFound(String),

    /// Signing was requested but no shared key is configured
    #[error("No signing key configured")]
    NoSigningKey,

    /// Crypto errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Backend is not able to serve requests
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Network errors
    #[error("Network error: {0}")]
    Network(String),

    /// The collector refused the request; resending cannot help
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MetricError {
    /// Whether sending the same request again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::HttpClient(_) | Self::Io(_) | Self::Network(_) | Self::Unavailable(_)
        )
    }
}
