//! # metric-service
//!
//! A two-sided telemetry pipeline.
//!
//! - The **agent** samples process and host figures on one cadence, signs
//!   each value and buffers it, then ships the buffer as a batch on a
//!   second cadence with retries.
//! - The **collector** validates incoming metrics, checks their integrity
//!   hashes and stores them in memory (optionally snapshotted to a file) or
//!   in a relational database.
//!
//! ```rust,no_run
//! use metric_service::config::{ServerConfig, load_server_config, ServerArgs};
//! use metric_service::server::run_server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config: ServerConfig = load_server_config(ServerArgs::default()).await?;
//!     run_server(config).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod agent;
pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use core::models::{Metric, MetricKind, MetricValue, Metrics};
pub use utils::error::{MetricError, Result};
