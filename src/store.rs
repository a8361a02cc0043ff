//! Whole-document JSON persistence for the card list and the telemetry
//! archive.
//!
//! Loading is fail-open: a missing or unreadable document yields the default
//! value so the hub always starts. Saving rewrites the whole document through
//! a sibling temp file, so a crash mid-write never leaves a truncated file.
use std::{io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

/// Read and decode the JSON document at `path`.
///
/// - missing file → `T::default()`, logged at `info`
/// - unreadable or malformed file → `T::default()`, logged at `warn`
pub async fn load<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "store: no document yet, starting empty");
            return T::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "store: failed to read document, starting empty");
            return T::default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "store: malformed document, starting empty");
            T::default()
        }
    }
}

/// Pretty-print `value` and replace the document at `path` with it.
pub async fn save<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let content = serde_json::to_vec_pretty(value).context("Failed to serialize document")?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &content)
        .await
        .with_context(|| format!("Failed to write {}", Path::new(&tmp).display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!(path = %path.display(), bytes = content.len(), "store: saved");
    Ok(())
}
