//! Server-side services

pub mod metrics;

pub use metrics::{MetricService, PersistenceMode};
