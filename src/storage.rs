//! JSON file persistence
//!
//! Every persisted collection (alerts, favorites, history) is a single JSON
//! document, read once at startup and rewritten wholesale on each mutation.
//! A missing file is an empty collection. An unreadable or malformed file is
//! reported as `StorageCorrupt`; `load_or_default` downgrades that to an empty
//! collection with a warning.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Outcome of loading a persisted collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No file yet
    Missing,
    /// Parsed successfully
    Loaded,
    /// File existed but could not be read or parsed; started empty
    Recovered,
}

/// Read and parse a JSON file; `Ok(None)` when it does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::StorageCorrupt(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| Error::StorageCorrupt(format!("{}: {}", path.display(), e)))
}

/// Load a collection, falling back to the default on missing or corrupt storage
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> (T, LoadStatus) {
    match read_json(path) {
        Ok(Some(value)) => (value, LoadStatus::Loaded),
        Ok(None) => {
            debug!("{} not found, starting empty", path.display());
            (T::default(), LoadStatus::Missing)
        }
        Err(e) => {
            warn!("{} (starting empty)", e);
            (T::default(), LoadStatus::Recovered)
        }
    }
}

/// Serialize and write a collection, replacing the previous file
///
/// Writes to a sibling temp file and renames it over the target so a crash
/// mid-write never leaves a truncated document behind.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    debug!("Wrote {}", path.display());
    Ok(())
}
