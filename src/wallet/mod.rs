//! Wallet analysis module
//!
//! Fetches address activity and classifies wallet usage:
//! - Activity sources (BlockCypher explorer API)
//! - Heuristic classification (wallet type, monthly rate, risk flags)
//!
//! # Architecture
//!
//! ```text
//! WalletSource → WalletSnapshot → WalletClassifier → WalletAnalysis
//! ```

pub mod blockcypher;
pub mod classifier;
pub mod source;
pub mod types;

pub use blockcypher::BlockCypherClient;
pub use classifier::WalletClassifier;
pub use source::WalletSource;
pub use types::{RiskFactor, WalletAnalysis, WalletKind, WalletSnapshot};
