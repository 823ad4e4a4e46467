//! Helper functions for creating specific error types

use super::types::MetricError;

impl MetricError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unsupported_type<S: Into<String>>(kind: S) -> Self {
        Self::UnsupportedMetricType(kind.into())
    }

    pub fn hash_mismatch<S: Into<String>>(id: S) -> Self {
        Self::HashMismatch(id.into())
    }

    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self::Rejected(message.into())
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}
