//! Integration tests for metric-service
//!
//! These exercise real storage, the HTTP surface and agent delivery
//! together.

pub mod agent_tests;
pub mod database_tests;
pub mod server_tests;
