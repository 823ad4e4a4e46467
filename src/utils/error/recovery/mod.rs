//! Error recovery utilities
//!
//! Bounded retries with capped exponential backoff.

mod retry;
mod types;

pub use retry::RetryPolicy;
pub use types::RetryConfig;
