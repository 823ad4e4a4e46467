//! Pending batch shared by the poll and push cadences

use crate::core::models::{Metric, Metrics};
use parking_lot::Mutex;

/// Metrics collected since the last push
#[derive(Debug, Default)]
pub struct MetricBuffer {
    pending: Mutex<Vec<Metric>>,
}

impl MetricBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&self, metrics: impl IntoIterator<Item = Metric>) {
        self.pending.lock().extend(metrics);
    }

    /// Swap the pending batch for an empty one
    pub fn take(&self) -> Metrics {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
