//! Price source interface and caching wrapper

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// Current fiat price for an asset symbol
///
/// Any error means "no price available now"; callers do not distinguish causes.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self, symbol: &str) -> Result<f64>;
}

#[async_trait]
impl<S: PriceSource + ?Sized> PriceSource for std::sync::Arc<S> {
    async fn current_price(&self, symbol: &str) -> Result<f64> {
        (**self).current_price(symbol).await
    }
}

/// Price source wrapper that reuses recent prices for `ttl`
///
/// Failures are not cached.
pub struct CachedPriceSource<S> {
    inner: S,
    ttl: Duration,
    /// symbol -> (price, fetched at)
    prices: RwLock<HashMap<String, (f64, Instant)>>,
}

impl<S: PriceSource> CachedPriceSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Get cached price for a symbol if still fresh
    pub async fn cached(&self, symbol: &str) -> Option<f64> {
        let prices = self.prices.read().await;
        prices
            .get(&symbol.to_lowercase())
            .filter(|(_, at)| at.elapsed() < self.ttl)
            .map(|(price, _)| *price)
    }

    /// Drop every cached price
    pub async fn clear(&self) {
        self.prices.write().await.clear();
    }
}

#[async_trait]
impl<S: PriceSource> PriceSource for CachedPriceSource<S> {
    async fn current_price(&self, symbol: &str) -> Result<f64> {
        if let Some(price) = self.cached(symbol).await {
            debug!("Price cache hit for {}", symbol);
            return Ok(price);
        }

        let price = self.inner.current_price(symbol).await?;
        self.prices
            .write()
            .await
            .insert(symbol.to_lowercase(), (price, Instant::now()));
        Ok(price)
    }
}
