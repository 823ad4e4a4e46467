//! Server persistence mode, fixed for the process lifetime

use crate::config::ServerConfig;
use std::path::PathBuf;
use std::time::Duration;

/// How metrics outlive the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Relational storage; snapshot files are never written
    Database,
    /// In-memory storage, full snapshot after every successful write
    FileSynchronous { path: PathBuf },
    /// In-memory storage, snapshot on a background timer and at shutdown
    FilePeriodic { path: PathBuf, interval: Duration },
    /// In-memory storage with no snapshot file
    Volatile,
}

impl PersistenceMode {
    /// Select the mode from configuration
    pub fn from_config(config: &ServerConfig) -> Self {
        if config.database.is_enabled() {
            return PersistenceMode::Database;
        }
        if config.store_file.trim().is_empty() {
            return PersistenceMode::Volatile;
        }

        let path = PathBuf::from(&config.store_file);
        match config.store_interval {
            0 => PersistenceMode::FileSynchronous { path },
            secs => PersistenceMode::FilePeriodic {
                path,
                interval: Duration::from_secs(secs),
            },
        }
    }

    /// Snapshot file, for the file-backed modes
    pub fn snapshot_path(&self) -> Option<&PathBuf> {
        match self {
            PersistenceMode::FileSynchronous { path }
            | PersistenceMode::FilePeriodic { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn saves_on_write(&self) -> bool {
        matches!(self, PersistenceMode::FileSynchronous { .. })
    }

    pub fn saves_on_shutdown(&self) -> bool {
        matches!(self, PersistenceMode::FilePeriodic { .. })
    }
}
