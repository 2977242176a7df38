//! Alert evaluation
//!
//! One pass over the pending alerts: fetch each asset's price once, fire the
//! alerts whose condition is met, and persist the whole set in a single write
//! if anything fired. Feed failures skip the affected alerts for this pass.

use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::price::PriceSource;

use super::store::AlertStore;
use super::types::{AlertId, FiredAlert};

/// Evaluates pending alerts against a price source
pub struct AlertEvaluator<'a, P: PriceSource + ?Sized> {
    store: &'a mut AlertStore,
    feed: &'a P,
}

impl<'a, P: PriceSource + ?Sized> AlertEvaluator<'a, P> {
    pub fn new(store: &'a mut AlertStore, feed: &'a P) -> Self {
        Self { store, feed }
    }

    /// Run one evaluation pass
    ///
    /// Returns the alerts that transitioned to triggered in this pass, in id
    /// order. Already triggered alerts are never re-evaluated. Errors only
    /// come from persisting the fired alerts.
    pub async fn check_all(&mut self) -> Result<Vec<FiredAlert>> {
        // symbol -> price for this pass; None records a failed lookup
        let mut prices: HashMap<String, Option<f64>> = HashMap::new();
        let mut fires: HashMap<AlertId, f64> = HashMap::new();

        let pending: Vec<(AlertId, String)> = self
            .store
            .list(false)
            .into_iter()
            .map(|(id, alert)| (id, alert.crypto.clone()))
            .collect();

        for (id, symbol) in pending {
            let price = match prices.get(&symbol) {
                Some(cached) => *cached,
                None => {
                    let fetched = match self.feed.current_price(&symbol).await {
                        Ok(price) => Some(price),
                        Err(e) => {
                            warn!("No price for {} this pass: {}", symbol, e);
                            None
                        }
                    };
                    prices.insert(symbol.clone(), fetched);
                    fetched
                }
            };

            let Some(price) = price else {
                debug!("Skipping alert {} ({}): price unavailable", id, symbol);
                continue;
            };

            if self.store.get(id).is_some_and(|alert| alert.should_fire(price)) {
                fires.insert(id, price);
            }
        }

        if fires.is_empty() {
            debug!("No alerts fired");
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut ids: Vec<AlertId> = fires.keys().copied().collect();
        ids.sort_unstable();

        let fired_ids = self.store.update_many(ids, |id, alert| {
            if let Some(price) = fires.get(&id) {
                alert.mark_triggered(*price, now);
            }
        })?;

        let fired: Vec<FiredAlert> = fired_ids
            .into_iter()
            .filter_map(|id| {
                self.store.get(id).map(|alert| FiredAlert {
                    id,
                    alert: alert.clone(),
                })
            })
            .collect();

        for f in &fired {
            info!(
                "Alert {} fired: {} {} {} (observed {})",
                f.id,
                f.alert.crypto,
                f.alert.condition,
                f.alert.price,
                f.alert.triggered_price.unwrap_or_default()
            );
        }

        Ok(fired)
    }
}
