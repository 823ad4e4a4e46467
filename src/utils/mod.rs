//! Shared utilities: errors, crypto, logging, signals

pub mod crypto;
pub mod error;
pub mod logging;
pub mod shutdown;
