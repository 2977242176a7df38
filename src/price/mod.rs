//! Price feed module

pub mod coingecko;
pub mod feed;

pub use coingecko::CoinGeckoFeed;
pub use feed::{CachedPriceSource, PriceSource};
