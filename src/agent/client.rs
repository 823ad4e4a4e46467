//! Delivery of batches to the collector

use crate::config::AgentConfig;
use crate::core::models::Metric;
use crate::utils::crypto::{ENCRYPTION_HEADER, ENCRYPTION_SCHEME, PayloadEncryptor};
use crate::utils::error::{MetricError, Result, RetryConfig, RetryPolicy};
use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::Client;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Sends one batch to the collector
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsClient: Send + Sync {
    async fn push_metrics(&self, metrics: Vec<Metric>) -> Result<()>;
}

/// `POST /updates/` over reqwest with gzip, optional encryption and retries
pub struct HttpMetricsClient {
    client: Client,
    url: String,
    encryptor: Option<PayloadEncryptor>,
    retry: RetryPolicy,
}

impl HttpMetricsClient {
    /// Client for `base_url` (scheme and authority, no path)
    pub fn new(base_url: &str, timeout: Duration, retry: RetryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MetricError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: updates_url(base_url),
            encryptor: None,
            retry: RetryPolicy::new(retry),
        })
    }

    /// Build the client described by the agent configuration
    pub async fn from_config(config: &AgentConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout);
        let mut builder = Client::builder().timeout(timeout);

        let ca_file = config.ca_file.as_deref().filter(|p| !p.is_empty());
        if let Some(path) = ca_file {
            let pem = tokio::fs::read(path).await?;
            let certificate = reqwest::Certificate::from_pem(&pem)?;
            builder = builder.add_root_certificate(certificate);
            info!("Trusting collector certificate authority {}", path);
        }

        let client = builder
            .build()
            .map_err(|e| MetricError::config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = if has_scheme(&config.address) {
            config.address.clone()
        } else if ca_file.is_some() {
            format!("https://{}", config.address)
        } else {
            format!("http://{}", config.address)
        };

        let encryptor = match config.crypto_key.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => {
                info!("Payload encryption enabled ({})", path);
                Some(PayloadEncryptor::from_file(path).await?)
            }
            None => None,
        };

        Ok(Self {
            client,
            url: updates_url(&base_url),
            encryptor,
            retry: RetryPolicy::new(RetryConfig::from(&config.retry)),
        })
    }

    /// Target endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// JSON, then encryption, then gzip
    fn encode(&self, metrics: &[Metric]) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(metrics)?;
        let payload = match &self.encryptor {
            Some(encryptor) => encryptor.encrypt(&json)?,
            None => json,
        };
        gzip(&payload)
    }

    async fn send(&self, body: Vec<u8>) -> Result<()> {
        let content_type = if self.encryptor.is_some() {
            "application/octet-stream"
        } else {
            "application/json"
        };

        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_ENCODING, "gzip")
            .body(body);
        if self.encryptor.is_some() {
            request = request.header(ENCRYPTION_HEADER, ENCRYPTION_SCHEME);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = format!("Collector answered {} for {}", status, self.url);
        if status.is_client_error() {
            Err(MetricError::rejected(message))
        } else {
            Err(MetricError::network(message))
        }
    }
}

#[async_trait]
impl MetricsClient for HttpMetricsClient {
    async fn push_metrics(&self, metrics: Vec<Metric>) -> Result<()> {
        let body = self.encode(&metrics)?;
        debug!(
            "Pushing {} metrics ({} bytes) to {}",
            metrics.len(),
            body.len(),
            self.url
        );

        self.retry
            .call_if(|| self.send(body.clone()), MetricError::is_retryable)
            .await
    }
}

fn has_scheme(address: &str) -> bool {
    address.starts_with("http://") || address.starts_with("https://")
}

fn updates_url(base_url: &str) -> String {
    format!("{}/updates/", base_url.trim_end_matches('/'))
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
