//! In-memory metric repository

use super::MetricRepository;
use crate::core::models::{Metric, MetricKind, MetricValue, Metrics};
use crate::utils::error::{MetricError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    counters: HashMap<String, i64>,
    gauges: HashMap<String, f64>,
}

/// Previous value of an entry touched by a batch
enum UndoEntry {
    Counter(String, Option<i64>),
    Gauge(String, Option<f64>),
}

impl MemoryState {
    fn add_counter(&mut self, name: &str, delta: i64) -> Result<Option<i64>> {
        let previous = self.counters.get(name).copied();
        let total = previous.unwrap_or(0).checked_add(delta).ok_or_else(|| {
            MetricError::validation(format!("Counter '{}' would overflow", name))
        })?;
        self.counters.insert(name.to_string(), total);
        Ok(previous)
    }

    fn set_gauge(&mut self, name: &str, value: f64) -> Option<f64> {
        self.gauges.insert(name.to_string(), value)
    }

    fn apply(&mut self, metric: &Metric) -> Result<UndoEntry> {
        match metric.validate()? {
            MetricValue::Counter(delta) => {
                let previous = self.add_counter(&metric.id, delta)?;
                Ok(UndoEntry::Counter(metric.id.clone(), previous))
            }
            MetricValue::Gauge(value) => {
                let previous = self.set_gauge(&metric.id, value);
                Ok(UndoEntry::Gauge(metric.id.clone(), previous))
            }
        }
    }

    fn undo(&mut self, log: Vec<UndoEntry>) {
        for entry in log.into_iter().rev() {
            match entry {
                UndoEntry::Counter(name, Some(previous)) => {
                    self.counters.insert(name, previous);
                }
                UndoEntry::Counter(name, None) => {
                    self.counters.remove(&name);
                }
                UndoEntry::Gauge(name, Some(previous)) => {
                    self.gauges.insert(name, previous);
                }
                UndoEntry::Gauge(name, None) => {
                    self.gauges.remove(&name);
                }
            }
        }
    }
}

/// Counters and gauges kept in two maps behind one lock
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricRepository for InMemoryRepository {
    async fn save_counter(&self, name: &str, delta: i64) -> Result<()> {
        self.state.write().add_counter(name, delta)?;
        Ok(())
    }

    async fn save_gauge(&self, name: &str, value: f64) -> Result<()> {
        self.state.write().set_gauge(name, value);
        Ok(())
    }

    async fn save_metrics_batch(&self, metrics: &[Metric]) -> Result<()> {
        let mut state = self.state.write();
        let mut log = Vec::with_capacity(metrics.len());

        for metric in metrics {
            match state.apply(metric) {
                Ok(entry) => log.push(entry),
                Err(e) => {
                    debug!(
                        "Batch element '{}' failed, undoing {} writes",
                        metric.id,
                        log.len()
                    );
                    state.undo(log);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn get_metric_by_key(&self, name: &str) -> Result<Metric> {
        let state = self.state.read();
        if let Some(delta) = state.counters.get(name) {
            return Ok(Metric::counter(name, *delta));
        }
        if let Some(value) = state.gauges.get(name) {
            return Ok(Metric::gauge(name, *value));
        }
        Err(MetricError::not_found(name))
    }

    async fn get_typed_metric(&self, kind: &MetricKind, name: &str) -> Result<Metric> {
        kind.ensure_supported()?;
        let state = self.state.read();
        let found = match kind {
            MetricKind::Counter => state.counters.get(name).map(|d| Metric::counter(name, *d)),
            MetricKind::Gauge => state.gauges.get(name).map(|v| Metric::gauge(name, *v)),
            MetricKind::Other(_) => None,
        };
        found.ok_or_else(|| MetricError::not_found(name))
    }

    async fn get_all_metrics(&self) -> Result<Metrics> {
        let state = self.state.read();
        let counters = state
            .counters
            .iter()
            .map(|(name, delta)| Metric::counter(name.as_str(), *delta));
        let gauges = state
            .gauges
            .iter()
            .map(|(name, value)| Metric::gauge(name.as_str(), *value));
        Ok(counters.chain(gauges).collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn migrate(&self) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
