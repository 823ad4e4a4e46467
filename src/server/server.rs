//! HTTP server core implementation

use crate::config::ServerConfig;
use crate::server::middleware::RequestIdMiddleware;
use crate::server::routes;
use crate::server::state::AppState;
use crate::services::MetricService;
use crate::utils::crypto::PayloadDecryptor;
use crate::utils::error::{MetricError, Result};
use crate::utils::shutdown::shutdown_signal;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{Compress, Logger, NormalizePath},
    web,
};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

/// Collector HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Build the service and its storage from configuration
    pub async fn new(config: &ServerConfig) -> Result<Self> {
        info!("Creating HTTP server");

        let service = MetricService::from_config(config).await?;

        let decryptor = match config.crypto_key.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => {
                info!("Payload decryption enabled ({})", path);
                Some(PayloadDecryptor::from_file(path).await?)
            }
            None => None,
        };

        Ok(Self {
            config: config.clone(),
            state: AppState::new(service, decryptor),
        })
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
        max_body_size: usize,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let json_config = web::JsonConfig::default()
            .limit(max_body_size)
            .error_handler(|err, _req| MetricError::validation(err.to_string()).into());

        App::new()
            .app_data(state)
            .app_data(json_config)
            .app_data(web::PayloadConfig::new(max_body_size))
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .configure(routes::configure_routes)
    }

    /// Serve until `shutdown` resolves, then drain and release storage
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.address.clone();
        let max_body_size = self.config.max_body_size;
        let service = self.state.service.clone();
        let state = web::Data::new(self.state);

        let mut server = ActixHttpServer::new(move || Self::create_app(state.clone(), max_body_size))
            .shutdown_timeout(self.config.shutdown_timeout)
            .disable_signals();
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = match &self.config.tls {
            Some(tls) => {
                info!("Starting HTTPS server on {}", bind_addr);
                let rustls_config = Self::load_rustls_config(tls)?;
                server
                    .bind_rustls_0_23(&bind_addr, rustls_config)
                    .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            }
            None => {
                info!("Starting HTTP server on {}", bind_addr);
                server
                    .bind(&bind_addr)
                    .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            }
        }
        .run();

        let handle = server.handle();
        let grace = Duration::from_secs(self.config.shutdown_timeout);
        tokio::spawn(async move {
            shutdown.await;
            info!("Draining in-flight requests (up to {:?})", grace);
            handle.stop(true).await;
        });

        let served = server.await;
        if let Err(e) = service.shutdown().await {
            error!("Storage shutdown failed: {}", e);
        }
        served.map_err(|e| MetricError::internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn start(self) -> Result<()> {
        self.start_with_shutdown(shutdown_signal()).await
    }
}
