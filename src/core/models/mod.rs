//! Core data models

pub mod metric;

pub use metric::{Metric, MetricKind, MetricValue, Metrics};
