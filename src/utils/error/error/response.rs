//! HTTP response handling for errors

use super::types::MetricError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for MetricError {
    fn status_code(&self) -> StatusCode {
        match self {
            MetricError::Validation(_) | MetricError::HashMismatch(_) => StatusCode::BAD_REQUEST,
            MetricError::NotFound(_) => StatusCode::NOT_FOUND,
            MetricError::UnsupportedMetricType(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            MetricError::Validation(_) => ("VALIDATION_ERROR", self.to_string()),
            MetricError::HashMismatch(_) => ("HASH_MISMATCH", self.to_string()),
            MetricError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            MetricError::UnsupportedMetricType(_) => ("NOT_IMPLEMENTED", self.to_string()),
            MetricError::Database(_) => (
                "DATABASE_ERROR",
                "Database operation failed".to_string(),
            ),
            MetricError::Io(_) => ("STORAGE_ERROR", "Storage operation failed".to_string()),
            MetricError::Unavailable(_) => ("SERVICE_UNAVAILABLE", self.to_string()),
            _ => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
                request_id: None,
            },
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

/// Standard error response format
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    pub request_id: Option<String>,
}
