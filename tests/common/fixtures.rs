//! Metric fixtures and mocks shared by the integration tests

use async_trait::async_trait;
use metric_service::agent::{MetricsClient, Sampler};
use metric_service::core::models::Metric;
use metric_service::services::{MetricService, PersistenceMode};
use metric_service::storage::{InMemoryRepository, MetricRepository};
use metric_service::utils::crypto::create_hmac_signature;
use metric_service::utils::error::Result;
use std::sync::Arc;

/// Shared key used by the signed scenarios
pub const TEST_KEY: &str = "test";

mockall::mock! {
    pub Client {}

    #[async_trait]
    impl MetricsClient for Client {
        async fn push_metrics(&self, metrics: Vec<Metric>) -> Result<()>;
    }
}

/// Sign a metric the way the agent does
pub fn signed(mut metric: Metric, key: &str) -> Metric {
    let message = metric.canonical_message().expect("valid metric");
    metric.hash = Some(create_hmac_signature(key, &message).expect("signature"));
    metric
}

/// Service over a fresh in-memory repository without snapshots
pub fn memory_service(key: Option<&str>) -> Arc<MetricService> {
    service_over(Arc::new(InMemoryRepository::new()), key)
}

pub fn service_over(repository: Arc<dyn MetricRepository>, key: Option<&str>) -> Arc<MetricService> {
    Arc::new(MetricService::new(
        repository,
        key.map(str::to_string),
        PersistenceMode::Volatile,
    ))
}

/// Sampler returning a fixed set of gauges
pub struct StaticSampler(pub Vec<(&'static str, f64)>);

impl Sampler for StaticSampler {
    fn name(&self) -> &'static str {
        "static"
    }

    fn sample(&self) -> Result<Vec<(String, f64)>> {
        Ok(self
            .0
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect())
    }
}
