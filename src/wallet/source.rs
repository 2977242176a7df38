//! Wallet activity source interface

use async_trait::async_trait;

use crate::error::Result;

use super::types::WalletSnapshot;

/// Supplies activity snapshots for an address
///
/// Implementations surface invalid addresses and upstream failures as errors,
/// so the classifier only ever sees well-formed snapshots.
#[async_trait]
pub trait WalletSource: Send + Sync {
    /// Fetch the current snapshot for `address` on `symbol`'s chain
    async fn fetch_snapshot(&self, address: &str, symbol: &str) -> Result<WalletSnapshot>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}
