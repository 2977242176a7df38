//! BlockCypher address API client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::asset::AssetRegistry;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

use super::source::WalletSource;
use super::types::WalletSnapshot;

/// Address endpoint response (fields we use)
#[derive(Debug, Clone, Deserialize)]
pub struct AddressResponse {
    #[serde(default)]
    pub final_balance: u128,
    #[serde(default)]
    pub total_received: u128,
    #[serde(default)]
    pub n_tx: u64,
    #[serde(default)]
    pub unconfirmed_n_tx: Option<u64>,
    #[serde(default)]
    pub txrefs: Vec<TxRef>,
    /// Set when `txrefs` was cut short by the page limit
    #[serde(default, rename = "hasMore")]
    pub has_more: bool,
}

/// Transaction reference attached to an address
#[derive(Debug, Clone, Deserialize)]
pub struct TxRef {
    #[serde(default)]
    pub confirmed: Option<DateTime<Utc>>,
}

impl AddressResponse {
    /// Convert to a snapshot. The first-seen time is the earliest confirmed
    /// transaction, known only when the full history was returned.
    pub fn into_snapshot(self, symbol: &str) -> WalletSnapshot {
        let complete = !self.has_more && self.txrefs.len() as u64 >= self.n_tx;
        let first_tx_time = if complete {
            self.txrefs
                .iter()
                .filter_map(|r| r.confirmed)
                .min()
                .map(|t| t.timestamp())
        } else {
            debug!("Partial transaction history, first transaction time unknown");
            None
        };

        WalletSnapshot {
            symbol: symbol.to_lowercase(),
            balance: self.final_balance,
            total_received: self.total_received,
            n_tx: self.n_tx,
            first_tx_time,
            unconfirmed_n_tx: self.unconfirmed_n_tx,
        }
    }
}

/// Wallet source backed by the BlockCypher REST API
pub struct BlockCypherClient {
    client: reqwest::Client,
    base_url: String,
    assets: AssetRegistry,
}

impl BlockCypherClient {
    pub fn new(api: &ApiConfig, assets: AssetRegistry) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.timeout_ms))
            .user_agent(api.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: api.blockcypher_url.trim_end_matches('/').to_string(),
            assets,
        })
    }

    fn address_url(&self, chain: &str, address: &str) -> String {
        format!("{}/{}/addrs/{}", self.base_url, chain, address)
    }
}

#[async_trait]
impl WalletSource for BlockCypherClient {
    async fn fetch_snapshot(&self, address: &str, symbol: &str) -> Result<WalletSnapshot> {
        self.assets.validate_address(symbol, address)?;

        let asset = self.assets.require(symbol)?;
        let chain = asset.chain.as_deref().ok_or_else(|| {
            Error::UnsupportedAsset(format!("{} has no explorer chain configured", symbol))
        })?;

        let url = self.address_url(chain, address);
        debug!("Fetching wallet data: {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::WalletSource(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::WalletSource(format!(
                "invalid address or API error (HTTP {})",
                status.as_u16()
            )));
        }

        let body: AddressResponse = resp
            .json()
            .await
            .map_err(|e| Error::WalletSource(format!("malformed response: {}", e)))?;

        let snapshot = body.into_snapshot(symbol);
        info!(
            "Fetched {} wallet {}: {} transactions",
            symbol, address, snapshot.n_tx
        );
        Ok(snapshot)
    }

    fn name(&self) -> &'static str {
        "blockcypher"
    }
}
