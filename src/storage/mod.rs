//! Storage layer for metrics
//!
//! Every backend implements [`MetricRepository`]; the rest of the crate only
//! sees `Arc<dyn MetricRepository>` chosen once at startup by
//! [`create_repository`].

/// Relational storage on SeaORM
pub mod database;
/// Process-local storage
pub mod memory;

use crate::config::DatabaseConfig;
use crate::core::models::{Metric, MetricKind, Metrics};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub use memory::InMemoryRepository;

/// Repository contract shared by all backends
#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// Add `delta` to the counter `name`, creating it at `delta` if absent
    async fn save_counter(&self, name: &str, delta: i64) -> Result<()>;

    /// Replace the gauge `name`, creating it if absent
    async fn save_gauge(&self, name: &str, value: f64) -> Result<()>;

    /// Apply every element with the single-item rules as one all-or-nothing unit
    async fn save_metrics_batch(&self, metrics: &[Metric]) -> Result<()>;

    /// Look a name up among counters first, then gauges
    async fn get_metric_by_key(&self, name: &str) -> Result<Metric>;

    /// Look up one `(name, kind)` entry
    async fn get_typed_metric(&self, kind: &MetricKind, name: &str) -> Result<Metric>;

    /// Full snapshot, unordered
    async fn get_all_metrics(&self) -> Result<Metrics>;

    /// Liveness check
    async fn ping(&self) -> Result<()>;

    /// Idempotent schema setup
    async fn migrate(&self) -> Result<()>;

    /// Release backend resources
    async fn shutdown(&self) -> Result<()>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the repository selected by configuration.
///
/// A configured database URL selects the relational backend (connected and
/// migrated here); otherwise metrics live in process memory.
pub async fn create_repository(config: &DatabaseConfig) -> Result<Arc<dyn MetricRepository>> {
    if config.is_enabled() {
        let db = database::Database::new(config).await?;
        db.migrate().await?;
        info!("Using relational metric storage");
        Ok(Arc::new(db))
    } else {
        info!("Using in-memory metric storage");
        Ok(Arc::new(InMemoryRepository::new()))
    }
}
