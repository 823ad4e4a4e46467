//! Ingestion service
//!
//! The only component that talks to the repository. It dispatches by kind,
//! checks integrity hashes and owns the snapshot side effects of the
//! selected [`PersistenceMode`].

mod persistence;
mod snapshot;

pub use persistence::PersistenceMode;
pub use snapshot::{read_snapshot, write_snapshot};

use crate::config::ServerConfig;
use crate::core::models::{Metric, MetricKind, MetricValue, Metrics};
use crate::storage::{MetricRepository, create_repository};
use crate::utils::crypto::hmac::{constant_time_eq, create_hmac_signature};
use crate::utils::error::{MetricError, Result};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Server-side metric orchestration
pub struct MetricService {
    repository: Arc<dyn MetricRepository>,
    signing_key: Option<String>,
    persistence: PersistenceMode,
    snapshot_lock: tokio::sync::Mutex<()>,
    snapshot_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl MetricService {
    /// Create a service over an existing repository
    pub fn new(
        repository: Arc<dyn MetricRepository>,
        signing_key: Option<String>,
        persistence: PersistenceMode,
    ) -> Self {
        Self {
            repository,
            signing_key: signing_key.filter(|k| !k.is_empty()),
            persistence,
            snapshot_lock: tokio::sync::Mutex::new(()),
            snapshot_task: parking_lot::Mutex::new(None),
        }
    }

    /// Build the repository, select the persistence mode and restore the
    /// snapshot when asked to
    pub async fn from_config(config: &ServerConfig) -> Result<Arc<Self>> {
        let repository = create_repository(&config.database).await?;
        let persistence = PersistenceMode::from_config(config);
        info!(
            "Metric storage: {} ({:?})",
            repository.backend_name(),
            persistence
        );

        let service = Arc::new(Self::new(
            repository,
            config.signing_key().map(str::to_string),
            persistence,
        ));

        if config.restore && service.persistence.snapshot_path().is_some() {
            service.load_metrics_from_disk().await?;
        }
        service.start_periodic_snapshots();

        Ok(service)
    }

    pub fn persistence(&self) -> &PersistenceMode {
        &self.persistence
    }

    /// Store one metric according to its kind
    pub async fn add_metric(&self, metric: &Metric) -> Result<()> {
        match metric.validate()? {
            MetricValue::Counter(delta) => self.repository.save_counter(&metric.id, delta).await?,
            MetricValue::Gauge(value) => self.repository.save_gauge(&metric.id, value).await?,
        }
        self.after_write().await
    }

    /// Store a batch as one unit
    pub async fn add_metric_batch(&self, metrics: &[Metric]) -> Result<()> {
        if metrics.is_empty() {
            return Ok(());
        }
        self.repository.save_metrics_batch(metrics).await?;
        self.after_write().await
    }

    /// The write is already committed here, so a failed snapshot is only
    /// logged
    async fn after_write(&self) -> Result<()> {
        if self.persistence.saves_on_write() {
            if let Err(e) = self.save_metrics_to_disk().await {
                error!("Synchronous snapshot failed: {}", e);
            }
        }
        Ok(())
    }

    /// Look a name up among counters, then gauges
    pub async fn get_metric_by_key(&self, name: &str) -> Result<Metric> {
        self.repository
            .get_metric_by_key(name)
            .await
            .map_err(|e| not_found_or(e, name))
    }

    /// Look up one `(kind, name)` entry
    pub async fn get_metric(&self, kind: &MetricKind, name: &str) -> Result<Metric> {
        self.repository
            .get_typed_metric(kind, name)
            .await
            .map_err(|e| not_found_or(e, name))
    }

    pub async fn get_all_metrics(&self) -> Result<Metrics> {
        self.repository.get_all_metrics().await
    }

    /// HMAC-SHA256 of `msg`; `NoSigningKey` when signing is off
    pub fn create_signed_hash(&self, msg: &str) -> Result<String> {
        match &self.signing_key {
            Some(key) => create_hmac_signature(key, msg),
            None => Err(MetricError::NoSigningKey),
        }
    }

    /// Reject a metric whose hash does not match. Without a key every
    /// metric passes.
    pub fn verify_hash(&self, metric: &Metric) -> Result<()> {
        let message = metric.canonical_message()?;
        let expected = match self.create_signed_hash(&message) {
            Ok(hash) => hash,
            Err(MetricError::NoSigningKey) => return Ok(()),
            Err(e) => return Err(e),
        };

        match metric.hash.as_deref() {
            Some(hash) if constant_time_eq(&expected, hash) => Ok(()),
            _ => Err(MetricError::hash_mismatch(metric.id.clone())),
        }
    }

    /// Attach a hash when signing is enabled
    pub fn sign_metric(&self, metric: &mut Metric) -> Result<()> {
        let message = metric.canonical_message()?;
        match self.create_signed_hash(&message) {
            Ok(hash) => metric.hash = Some(hash),
            Err(MetricError::NoSigningKey) => debug!("Signing disabled, hash omitted"),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Dump every metric to the snapshot file
    pub async fn save_metrics_to_disk(&self) -> Result<()> {
        let Some(path) = self.persistence.snapshot_path() else {
            return Ok(());
        };

        let _guard = self.snapshot_lock.lock().await;
        let metrics = self.repository.get_all_metrics().await?;
        write_snapshot(path, &metrics).await
    }

    /// Restore the snapshot file into the repository
    pub async fn load_metrics_from_disk(&self) -> Result<()> {
        let Some(path) = self.persistence.snapshot_path() else {
            return Ok(());
        };

        let _guard = self.snapshot_lock.lock().await;
        let Some(metrics) = read_snapshot(path).await else {
            info!("No snapshot restored from {:?}", path);
            return Ok(());
        };

        // Counters are accumulated, so restore only on an empty start
        match self.repository.save_metrics_batch(&metrics).await {
            Ok(()) => info!("Restored {} metrics from {:?}", metrics.len(), path),
            Err(e) => warn!("Snapshot {:?} not restored: {}", path, e),
        }
        Ok(())
    }

    /// Spawn the periodic snapshot timer when the mode calls for it
    pub fn start_periodic_snapshots(self: &Arc<Self>) {
        let PersistenceMode::FilePeriodic { interval, .. } = &self.persistence else {
            return;
        };
        let interval = *interval;

        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(service) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = service.save_metrics_to_disk().await {
                    error!("Periodic snapshot failed: {}", e);
                }
            }
        });

        if let Some(previous) = self.snapshot_task.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Liveness of the storage backend
    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }

    /// Stop the timer, write the final snapshot when periodic snapshotting
    /// is active, then release the repository
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(task) = self.snapshot_task.lock().take() {
            task.abort();
        }

        if self.persistence.saves_on_shutdown() {
            match self.save_metrics_to_disk().await {
                Ok(()) => info!("Final snapshot written"),
                Err(e) => error!("Final snapshot failed: {}", e),
            }
        }

        self.repository.shutdown().await
    }
}

fn not_found_or(error: MetricError, name: &str) -> MetricError {
    match error {
        MetricError::NotFound(_) => MetricError::not_found(name),
        other => other,
    }
}
