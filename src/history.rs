//! Search history
//!
//! Every checked address is logged, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::storage;

/// One wallet lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub address: String,
    pub crypto: String,
    pub timestamp: DateTime<Utc>,
}

/// Persistent search log, capped at `max_entries`
pub struct HistoryLog {
    path: PathBuf,
    entries: Vec<SearchEntry>,
    max_entries: usize,
}

impl HistoryLog {
    /// Load history; missing or corrupt storage yields an empty log
    pub fn load<P: AsRef<Path>>(path: P, max_entries: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let (entries, _) = storage::load_or_default(&path);
        Self {
            path,
            entries,
            max_entries,
        }
    }

    /// Record a search at the front of the log
    pub fn add_search(&mut self, address: &str, crypto: &str) -> Result<()> {
        self.entries.insert(
            0,
            SearchEntry {
                address: address.to_string(),
                crypto: crypto.to_lowercase(),
                timestamp: Utc::now(),
            },
        );
        self.entries.truncate(self.max_entries);
        storage::write_json(&self.path, &self.entries)
    }

    /// Most recent searches, newest first
    pub fn recent(&self, limit: usize) -> &[SearchEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn clear(&mut self) -> Result<()> {
        let count = self.entries.len();
        self.entries.clear();
        storage::write_json(&self.path, &self.entries)?;
        info!("Cleared {} history entries", count);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
