//! Wallet Checker Library
//!
//! Wallet usage heuristics and a persistent price-alert engine for a
//! multi-asset wallet-checking CLI.

pub mod alert;
pub mod asset;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod favorites;
pub mod history;
pub mod price;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
