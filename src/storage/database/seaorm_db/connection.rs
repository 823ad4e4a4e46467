use crate::config::DatabaseConfig;
use crate::utils::error::{MetricError, Result};
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::super::migration::Migrator;
use super::types::{DatabaseBackendType, SeaOrmDatabase};

impl SeaOrmDatabase {
    /// Open a connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let backend_type = DatabaseBackendType::from_url(&config.url);

        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(config.connection_timeout.max(1)))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = Database::connect(opt)
            .await
            .map_err(MetricError::Database)?;

        info!("Database connection established ({:?})", backend_type);
        Ok(Self { db, backend_type })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");
        Migrator::up(&self.db, None).await.map_err(|e| {
            warn!("Migration failed: {}", e);
            MetricError::Database(e)
        })?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Close the pool. Every clone of the connection shares it.
    pub async fn close(&self) -> Result<()> {
        self.db.clone().close().await.map_err(MetricError::Database)?;
        info!("Database connection closed");
        Ok(())
    }

    /// Round trip to the database
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");
        self.db
            .ping()
            .await
            .map_err(|e| MetricError::Unavailable(format!("Database ping failed: {}", e)))?;
        debug!("Database health check passed");
        Ok(())
    }
}
