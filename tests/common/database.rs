//! Test database utilities
//!
//! Each test gets an isolated in-memory SQLite database with the schema
//! already migrated.

use metric_service::config::DatabaseConfig;
use metric_service::storage::MetricRepository;
use metric_service::storage::database::Database;
use std::sync::Arc;

/// In-memory SQLite config; a single connection keeps one shared database
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
    }
}

/// Isolated, migrated in-memory database
#[derive(Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let db = Database::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");
        db.migrate().await.expect("Failed to run database migrations");

        Self {
            inner: Arc::new(db),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner
    }

    /// The database as a repository trait object
    pub fn repository(&self) -> Arc<dyn MetricRepository> {
        self.inner.clone()
    }
}
