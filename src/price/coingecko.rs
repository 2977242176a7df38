//! CoinGecko simple-price client

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::asset::AssetRegistry;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

use super::feed::PriceSource;

/// Price source backed by the CoinGecko `/simple/price` endpoint
pub struct CoinGeckoFeed {
    client: reqwest::Client,
    base_url: String,
    fiat: String,
    assets: AssetRegistry,
}

impl CoinGeckoFeed {
    pub fn new(api: &ApiConfig, assets: AssetRegistry) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.timeout_ms))
            .user_agent(api.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: api.coingecko_url.trim_end_matches('/').to_string(),
            fiat: api.fiat.to_lowercase(),
            assets,
        })
    }

    /// Fiat currency prices are quoted in
    pub fn fiat(&self) -> &str {
        &self.fiat
    }
}

/// Pull `body[id][fiat]` out of a simple-price response
pub fn extract_price(body: &Value, id: &str, fiat: &str) -> Result<f64> {
    let price = body
        .get(id)
        .and_then(|coin| coin.get(fiat))
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::FeedUnavailable(format!("no {} price for {}", fiat, id)))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(Error::FeedUnavailable(format!(
            "invalid price for {}: {}",
            id, price
        )));
    }

    Ok(price)
}

#[async_trait]
impl PriceSource for CoinGeckoFeed {
    async fn current_price(&self, symbol: &str) -> Result<f64> {
        let id = self.assets.price_id(symbol);
        let url = format!("{}/simple/price", self.base_url);
        debug!("Fetching {} price for {} ({})", self.fiat, symbol, id);

        let resp = self
            .client
            .get(&url)
            .query(&[("ids", id.as_str()), ("vs_currencies", self.fiat.as_str())])
            .send()
            .await
            .map_err(|e| Error::FeedUnavailable(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::FeedUnavailable(format!(
                "HTTP {} for {}",
                status.as_u16(),
                id
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::FeedUnavailable(format!("malformed response: {}", e)))?;

        extract_price(&body, &id, &self.fiat)
    }
}
