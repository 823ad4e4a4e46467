/// Metric entity module
pub mod metric;
