//! Favorite wallets
//!
//! Named addresses the user checks often, keyed by address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::storage;

/// A saved wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub name: String,
    pub crypto: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Persistent favorites registry
pub struct FavoritesStore {
    path: PathBuf,
    favorites: HashMap<String, Favorite>,
}

impl FavoritesStore {
    /// Load favorites; missing or corrupt storage yields an empty registry
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let (favorites, _) = storage::load_or_default(&path);
        Self { path, favorites }
    }

    /// Add a favorite. Returns false if the address is already saved.
    pub fn add(&mut self, name: &str, address: &str, crypto: &str, notes: &str) -> Result<bool> {
        if self.favorites.contains_key(address) {
            return Ok(false);
        }

        self.favorites.insert(
            address.to_string(),
            Favorite {
                name: name.to_string(),
                crypto: crypto.to_lowercase(),
                notes: notes.to_string(),
                created_at: Utc::now(),
            },
        );
        storage::write_json(&self.path, &self.favorites)?;

        info!("Added favorite {} ({})", name, address);
        Ok(true)
    }

    /// Remove a favorite by address. Returns whether it existed.
    pub fn remove(&mut self, address: &str) -> Result<bool> {
        if self.favorites.remove(address).is_none() {
            return Ok(false);
        }
        storage::write_json(&self.path, &self.favorites)?;

        info!("Removed favorite {}", address);
        Ok(true)
    }

    /// All favorites as (address, favorite), sorted by name
    pub fn list(&self) -> Vec<(&str, &Favorite)> {
        let mut list: Vec<(&str, &Favorite)> = self
            .favorites
            .iter()
            .map(|(address, fav)| (address.as_str(), fav))
            .collect();
        list.sort_by(|a, b| a.1.name.cmp(&b.1.name).then(a.0.cmp(b.0)));
        list
    }

    pub fn get(&self, address: &str) -> Option<&Favorite> {
        self.favorites.get(address)
    }
}
