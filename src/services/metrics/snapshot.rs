//! Snapshot file I/O: one JSON array of metrics

use crate::core::models::{Metric, Metrics};
use crate::utils::error::Result;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Truncate and rewrite the snapshot file
pub async fn write_snapshot(path: &Path, metrics: &[Metric]) -> Result<()> {
    let payload = serde_json::to_vec(metrics)?;
    tokio::fs::write(path, payload).await?;
    debug!("Wrote {} metrics to {:?}", metrics.len(), path);
    Ok(())
}

/// Read the snapshot file.
///
/// A missing file is created empty and yields `None`. An unreadable or
/// invalid file is logged and also yields `None`, so restoring never fails.
pub async fn read_snapshot(path: &Path) -> Option<Metrics> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Snapshot {:?} does not exist, creating it", path);
            if let Err(e) = create_empty(path).await {
                warn!("Could not create snapshot {:?}: {}", path, e);
            }
            return None;
        }
        Err(e) => {
            warn!("Could not read snapshot {:?}: {}", path, e);
            return None;
        }
    };

    if content.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice::<Metrics>(&content) {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!("Ignoring unreadable snapshot {:?}: {}", path, e);
            None
        }
    }
}

async fn create_empty(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, b"").await
}
