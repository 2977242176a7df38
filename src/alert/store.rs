//! Alert store
//!
//! Owns the persisted alert set. Every mutation rewrites the whole file before
//! returning. The next id is recomputed as `max(id) + 1` on every load and is
//! never persisted, so ids freed by deleting the highest alert can be issued
//! again after a restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::{self, LoadStatus};

use super::types::{Alert, AlertCondition, AlertId};

/// Persistent collection of price alerts
#[derive(Debug)]
pub struct AlertStore {
    path: PathBuf,
    alerts: BTreeMap<AlertId, Alert>,
    next_id: AlertId,
    status: LoadStatus,
}

impl AlertStore {
    /// Load alerts from `path`. Missing or corrupt storage yields an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let (alerts, status): (BTreeMap<AlertId, Alert>, _) = storage::load_or_default(&path);
        let next_id = alerts.keys().next_back().map_or(1, |max| max + 1);

        match status {
            LoadStatus::Recovered => warn!(
                "Alert file {} was unreadable; starting with no alerts",
                path.display()
            ),
            _ => info!("Loaded {} alerts from {}", alerts.len(), path.display()),
        }

        Self {
            path,
            alerts,
            next_id,
            status,
        }
    }

    /// Create a pending alert and persist it
    ///
    /// Fails with `InvalidArgument` for an empty symbol, a non-finite or
    /// non-positive target, or a condition other than above/below.
    pub fn add(
        &mut self,
        symbol: &str,
        target_price: f64,
        condition: &str,
        note: &str,
    ) -> Result<AlertId> {
        if symbol.trim().is_empty() {
            return Err(Error::InvalidArgument("asset symbol cannot be empty".into()));
        }
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "target price must be a positive number, got {}",
                target_price
            )));
        }
        let condition: AlertCondition = condition.parse()?;

        let id = self.next_id;
        self.next_id += 1;

        let alert = Alert::new(symbol, target_price, condition, note);
        info!(
            "Adding alert {}: {} {} {}",
            id, alert.crypto, alert.condition, alert.price
        );
        self.alerts.insert(id, alert);

        if let Err(e) = self.save() {
            self.alerts.remove(&id);
            return Err(e);
        }

        Ok(id)
    }

    /// Delete an alert. Returns whether it existed.
    pub fn remove(&mut self, id: AlertId) -> Result<bool> {
        let Some(removed) = self.alerts.remove(&id) else {
            debug!("Alert {} not found", id);
            return Ok(false);
        };

        if let Err(e) = self.save() {
            self.alerts.insert(id, removed);
            return Err(e);
        }

        info!("Removed alert {}", id);
        Ok(true)
    }

    /// Alerts ordered by id; pending only unless `include_triggered`
    pub fn list(&self, include_triggered: bool) -> Vec<(AlertId, &Alert)> {
        self.alerts
            .iter()
            .filter(|(_, alert)| include_triggered || alert.is_pending())
            .map(|(id, alert)| (*id, alert))
            .collect()
    }

    /// Ids of pending alerts, ordered
    pub fn pending_ids(&self) -> Vec<AlertId> {
        self.list(false).into_iter().map(|(id, _)| id).collect()
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.get(&id)
    }

    /// Apply `mutator` to one pending alert and persist
    ///
    /// Triggered alerts are immutable; returns false for them and for
    /// unknown ids.
    pub fn update<F>(&mut self, id: AlertId, mutator: F) -> Result<bool>
    where
        F: FnOnce(&mut Alert),
    {
        let mut mutator = Some(mutator);
        let updated = self.update_many([id], |_, alert| {
            if let Some(f) = mutator.take() {
                f(alert);
            }
        })?;
        Ok(!updated.is_empty())
    }

    /// Apply `mutator` to each listed pending alert, then persist once
    ///
    /// Returns the ids that were mutated. Nothing is written when none were.
    /// If the write fails every mutated alert is restored to its prior state.
    pub fn update_many<I, F>(&mut self, ids: I, mut mutator: F) -> Result<Vec<AlertId>>
    where
        I: IntoIterator<Item = AlertId>,
        F: FnMut(AlertId, &mut Alert),
    {
        let mut previous: Vec<(AlertId, Alert)> = Vec::new();
        for id in ids {
            if let Some(alert) = self.alerts.get_mut(&id).filter(|a| a.is_pending()) {
                previous.push((id, alert.clone()));
                mutator(id, alert);
            }
        }

        if previous.is_empty() {
            return Ok(Vec::new());
        }

        if let Err(e) = self.save() {
            warn!("Failed to save {} updated alerts, reverting", previous.len());
            for (id, alert) in previous {
                self.alerts.insert(id, alert);
            }
            return Err(e);
        }

        Ok(previous.into_iter().map(|(id, _)| id).collect())
    }

    /// Id the next `add` will use
    pub fn next_id(&self) -> AlertId {
        self.next_id
    }

    /// True when the backing file existed but could not be parsed
    pub fn recovered_from_corrupt(&self) -> bool {
        self.status == LoadStatus::Recovered
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole alert file
    fn save(&self) -> Result<()> {
        storage::write_json(&self.path, &self.alerts)?;
        debug!("Saved {} alerts to {}", self.alerts.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> AlertStore {
        AlertStore::load(dir.path().join("data/price_alerts.json"))
    }

    #[test]
    fn test_add_then_list_pending() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);

        let id = store.add("BTC", 50_000.0, "Above", "test").unwrap();
        assert_eq!(id, 1);

        let pending = store.list(false);
        assert_eq!(pending.len(), 1);
        let (listed_id, alert) = pending[0];
        assert_eq!(listed_id, 1);
        assert_eq!(alert.crypto, "btc");
        assert_eq!(alert.price, 50_000.0);
        assert_eq!(alert.condition, AlertCondition::Above);
        assert_eq!(alert.note, "test");
        assert!(!alert.triggered);
        assert!(alert.triggered_at.is_none());
        assert!(alert.triggered_price.is_none());
    }

    #[test]
    fn test_add_rejects_invalid_arguments() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = store.add("btc", price, "above", "").unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }
        let err = store.add("btc", 10.0, "sideways", "").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = store.add("  ", 10.0, "below", "").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        // Nothing stored, nothing written, no id consumed
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_remove_missing_id() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        let id = store.add("eth", 2_000.0, "below", "").unwrap();
        assert!(!store.remove(id + 1).unwrap());
        assert_eq!(store.list(false).len(), 1);
        assert!(store.get(id).unwrap().is_pending());

        assert!(store.remove(id).unwrap());
        assert!(store.list(true).is_empty());
    }

    #[test]
    fn test_roundtrip_reload() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        store.add("btc", 50_000.0, "above", "moon").unwrap();
        store.add("eth", 1_500.0, "below", "").unwrap();
        store
            .update(2, |alert| {
                alert.mark_triggered(1_450.0, Utc::now());
            })
            .unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.list(true), store.list(true));
        assert_eq!(reloaded.list(false).len(), 1);
        assert_eq!(reloaded.next_id(), 3);
        assert!(!reloaded.recovered_from_corrupt());
    }

    #[test]
    fn test_ids_never_reused_in_session_but_recomputed_on_load() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        store.add("btc", 1.0, "above", "").unwrap();
        store.add("btc", 2.0, "above", "").unwrap();
        store.add("btc", 3.0, "above", "").unwrap();
        assert!(store.remove(3).unwrap());
        assert_eq!(store.add("btc", 4.0, "above", "").unwrap(), 4);
        assert!(store.remove(4).unwrap());

        // Highest surviving id is 2, so 3 is issued again after restart
        let mut reloaded = store_in(&dir);
        assert_eq!(reloaded.next_id(), 3);
        assert_eq!(reloaded.add("btc", 5.0, "below", "").unwrap(), 3);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(&path, "[[[").unwrap();

        let mut store = AlertStore::load(&path);
        assert!(store.is_empty());
        assert!(store.recovered_from_corrupt());
        assert_eq!(store.add("btc", 10.0, "above", "").unwrap(), 1);
    }

    #[test]
    fn test_loads_string_keyed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(
            &path,
            r#"{
              "7": {
                "crypto": "btc",
                "price": 60000.0,
                "condition": "above",
                "note": "",
                "created_at": "2024-01-01T00:00:00Z",
                "triggered": true,
                "triggered_at": "2024-02-01T00:00:00Z",
                "triggered_price": 61000.0
              }
            }"#,
        )
        .unwrap();

        let store = AlertStore::load(&path);
        assert_eq!(store.next_id(), 8);
        assert!(store.list(false).is_empty());
        assert_eq!(store.get(7).unwrap().triggered_price, Some(61_000.0));
    }

    #[test]
    fn test_failed_update_is_reverted() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store.add("btc", 100.0, "above", "").unwrap();

        // A directory at the temp path makes the write fail
        let blocker = dir.path().join("data/price_alerts.json.tmp");
        std::fs::create_dir(&blocker).unwrap();

        let result = store.update(id, |alert| {
            alert.mark_triggered(150.0, Utc::now());
        });
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(store.get(id).unwrap().is_pending());
        assert!(store.get(id).unwrap().triggered_price.is_none());

        std::fs::remove_dir(&blocker).unwrap();
        assert!(store
            .update(id, |alert| {
                alert.mark_triggered(150.0, Utc::now());
            })
            .unwrap());
        assert!(store_in(&dir).list(false).is_empty());
    }

    #[test]
    fn test_update_ignores_triggered_alerts() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store.add("btc", 100.0, "above", "").unwrap();

        assert!(store
            .update(id, |alert| {
                alert.mark_triggered(100.0, Utc::now());
            })
            .unwrap());
        assert!(!store.update(id, |alert| alert.note = "changed".into()).unwrap());
        assert!(!store.update(99, |alert| alert.note = "x".into()).unwrap());
        assert_eq!(store.get(id).unwrap().note, "");
    }
}
