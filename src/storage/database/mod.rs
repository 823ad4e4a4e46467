//! Database storage implementation using SeaORM
//!
//! Counters and gauges share one `metrics` table keyed by `(id, kind)`.
//! Writes are atomic upserts so concurrent writers never lose updates.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM database implementation module
pub mod seaorm_db;

pub use seaorm_db::DatabaseBackendType;
pub use seaorm_db::SeaOrmDatabase as Database;
