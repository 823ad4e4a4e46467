//! Error Handling utilities
//!
//! This module provides the error type and the retry policy.

pub mod error;
pub mod recovery;

pub use error::*;
pub use recovery::*;
