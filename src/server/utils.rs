//! HTTP server utility methods

use crate::config::TlsConfig;
use crate::server::server::HttpServer;
use crate::utils::error::{MetricError, Result};
use std::io::{BufReader, ErrorKind};
use std::sync::Arc;

impl HttpServer {
    /// Turn a bind failure into a configuration error
    pub(crate) fn format_bind_error(error: std::io::Error, bind_addr: &str) -> MetricError {
        match error.kind() {
            ErrorKind::AddrInUse => {
                MetricError::Config(format!("Address {} is already in use", bind_addr))
            }
            ErrorKind::PermissionDenied => MetricError::Config(format!(
                "Permission denied binding {}; use a port >= 1024",
                bind_addr
            )),
            _ => MetricError::Config(format!("Failed to bind to {}: {}", bind_addr, error)),
        }
    }

    /// Build a rustls server config from PEM files
    pub(crate) fn load_rustls_config(tls: &TlsConfig) -> Result<rustls::ServerConfig> {
        let cert_file = std::fs::File::open(&tls.cert_file).map_err(|e| {
            MetricError::Config(format!("Cannot open certificate {}: {}", tls.cert_file, e))
        })?;
        let key_file = std::fs::File::open(&tls.key_file).map_err(|e| {
            MetricError::Config(format!("Cannot open private key {}: {}", tls.key_file, e))
        })?;

        let certs = rustls_pemfile::certs(&mut BufReader::new(cert_file))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if certs.is_empty() {
            return Err(MetricError::Config(format!(
                "No certificates found in {}",
                tls.cert_file
            )));
        }
        let key = rustls_pemfile::private_key(&mut BufReader::new(key_file))?.ok_or_else(|| {
            MetricError::Config(format!("No private key found in {}", tls.key_file))
        })?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        rustls::ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| MetricError::Config(format!("TLS protocol setup failed: {}", e)))?
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| MetricError::Config(format!("Invalid TLS certificate/key: {}", e)))
    }
}
