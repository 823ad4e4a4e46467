//! Error handling for the metric pipeline
//!
//! This module defines the error type shared by every layer.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{MetricError, Result};
