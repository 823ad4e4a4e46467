//! Application state shared across HTTP handlers

use crate::services::MetricService;
use crate::utils::crypto::PayloadDecryptor;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Dependencies are injected here once; handlers never look them up from
/// ambient state.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion service
    pub service: Arc<MetricService>,
    /// Decrypts agent payloads when a private key is configured
    pub decryptor: Option<Arc<PayloadDecryptor>>,
}

impl AppState {
    pub fn new(service: Arc<MetricService>, decryptor: Option<PayloadDecryptor>) -> Self {
        Self {
            service,
            decryptor: decryptor.map(Arc::new),
        }
    }
}
