//! Type conversions for MetricError

use super::types::MetricError;

impl From<tokio::task::JoinError> for MetricError {
    fn from(err: tokio::task::JoinError) -> Self {
        MetricError::Internal(format!("Background task failed: {}", err))
    }
}

impl From<std::num::ParseIntError> for MetricError {
    fn from(err: std::num::ParseIntError) -> Self {
        MetricError::Validation(format!("Invalid integer value: {}", err))
    }
}

impl From<std::num::ParseFloatError> for MetricError {
    fn from(err: std::num::ParseFloatError) -> Self {
        MetricError::Validation(format!("Invalid float value: {}", err))
    }
}
