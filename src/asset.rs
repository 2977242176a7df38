//! Asset registry
//!
//! Static per-asset settings: display name, unit scale, explorer chain path,
//! price provider id and the address shape rule. Built once at startup from
//! the built-in table plus `[assets.*]` overrides, immutable afterwards.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::AssetConfig;
use crate::error::{Error, Result};

/// Bitcoin: legacy/P2SH base58 or bech32
const BTC_ADDRESS: &str = r"^(bc1[a-z0-9]{25,87}|[13][a-km-zA-HJ-NP-Z1-9]{25,34})$";
/// Litecoin: L/M/3 base58 or bech32
const LTC_ADDRESS: &str = r"^(ltc1[a-z0-9]{25,87}|[LM3][a-km-zA-HJ-NP-Z1-9]{26,33})$";
/// Ethereum: 20 bytes hex, optional 0x prefix
const ETH_ADDRESS: &str = r"^(0x)?[0-9a-fA-F]{40}$";

/// Scale between the smallest unit and the major unit of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitScale {
    /// Amount is divided by 10^decimals
    Decimals(u32),
    /// Amount is shown as the raw integer
    Raw,
}

impl UnitScale {
    /// Number of smallest units in one major unit
    pub fn factor(&self) -> u128 {
        match self {
            UnitScale::Decimals(d) => 10u128.pow(*d),
            UnitScale::Raw => 1,
        }
    }

    /// Render a smallest-unit amount in major units.
    ///
    /// Scaled amounts are rounded half-up to 8 decimal places; raw amounts
    /// are printed as-is.
    pub fn format(&self, amount: u128) -> String {
        match *self {
            UnitScale::Raw => amount.to_string(),
            UnitScale::Decimals(d) if d <= 8 => {
                let factor = 10u128.pow(d);
                let whole = amount / factor;
                let frac = (amount % factor) * 10u128.pow(8 - d);
                format!("{}.{:08}", whole, frac)
            }
            UnitScale::Decimals(d) => {
                let step = 10u128.pow(d - 8);
                let rounded = amount / step + u128::from(amount % step >= step / 2);
                format!("{}.{:08}", rounded / 100_000_000, rounded % 100_000_000)
            }
        }
    }

    /// Convert to major units as a float (for fiat valuation only)
    pub fn to_major(&self, amount: u128) -> f64 {
        amount as f64 / self.factor() as f64
    }
}

/// Resolved settings for one asset
#[derive(Debug, Clone)]
pub struct AssetSpec {
    pub symbol: String,
    pub display_name: String,
    pub unit_scale: UnitScale,
    pub chain: Option<String>,
    pub price_id: String,
    address_rule: Option<Regex>,
}

impl AssetSpec {
    /// Check that an address has the expected shape for this asset
    pub fn matches_address(&self, address: &str) -> bool {
        match &self.address_rule {
            Some(rule) => rule.is_match(address),
            None => !address.trim().is_empty(),
        }
    }
}

/// Immutable lookup table of supported assets
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: BTreeMap<String, AssetSpec>,
}

fn builtin_assets() -> Vec<(&'static str, AssetConfig)> {
    vec![
        (
            "btc",
            AssetConfig {
                display_name: Some("Bitcoin".to_string()),
                decimals: Some(8),
                chain: Some("btc/main".to_string()),
                price_id: Some("bitcoin".to_string()),
                address_pattern: Some(BTC_ADDRESS.to_string()),
            },
        ),
        (
            "ltc",
            AssetConfig {
                display_name: Some("Litecoin".to_string()),
                decimals: Some(8),
                chain: Some("ltc/main".to_string()),
                price_id: Some("litecoin".to_string()),
                address_pattern: Some(LTC_ADDRESS.to_string()),
            },
        ),
        (
            "eth",
            AssetConfig {
                display_name: Some("Ethereum".to_string()),
                decimals: Some(18),
                chain: Some("eth/main".to_string()),
                price_id: Some("ethereum".to_string()),
                address_pattern: Some(ETH_ADDRESS.to_string()),
            },
        ),
    ]
}

/// Overlay `patch` onto `base`, field by field
fn merge(base: AssetConfig, patch: &AssetConfig) -> AssetConfig {
    AssetConfig {
        display_name: patch.display_name.clone().or(base.display_name),
        decimals: patch.decimals.or(base.decimals),
        chain: patch.chain.clone().or(base.chain),
        price_id: patch.price_id.clone().or(base.price_id),
        address_pattern: patch.address_pattern.clone().or(base.address_pattern),
    }
}

impl AssetRegistry {
    /// Build the registry from the built-in table plus configured overrides
    pub fn new(overrides: &HashMap<String, AssetConfig>) -> Result<Self> {
        let mut merged: BTreeMap<String, AssetConfig> = builtin_assets()
            .into_iter()
            .map(|(symbol, cfg)| (symbol.to_string(), cfg))
            .collect();

        for (symbol, patch) in overrides {
            let symbol = symbol.to_lowercase();
            let base = merged.remove(&symbol).unwrap_or_default();
            merged.insert(symbol, merge(base, patch));
        }

        let mut assets = BTreeMap::new();
        for (symbol, cfg) in merged {
            let address_rule = cfg
                .address_pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|e| Error::Config(format!("Invalid address pattern for {}: {}", symbol, e)))?;

            let spec = AssetSpec {
                display_name: cfg.display_name.unwrap_or_else(|| symbol.to_uppercase()),
                unit_scale: cfg.decimals.map_or(UnitScale::Raw, UnitScale::Decimals),
                chain: cfg.chain,
                price_id: cfg.price_id.unwrap_or_else(|| symbol.clone()),
                address_rule,
                symbol: symbol.clone(),
            };
            assets.insert(symbol, spec);
        }

        debug!("Asset registry built with {} assets", assets.len());
        Ok(Self { assets })
    }

    /// Registry with only the built-in assets
    pub fn builtin() -> Self {
        // Built-in patterns are constants and always compile
        Self::new(&HashMap::new()).unwrap_or(Self {
            assets: BTreeMap::new(),
        })
    }

    /// Look up an asset by symbol (case-insensitive)
    pub fn get(&self, symbol: &str) -> Option<&AssetSpec> {
        self.assets.get(&symbol.to_lowercase())
    }

    /// Look up an asset, failing for unknown symbols
    pub fn require(&self, symbol: &str) -> Result<&AssetSpec> {
        self.get(symbol)
            .ok_or_else(|| Error::UnsupportedAsset(symbol.to_string()))
    }

    /// Unit scale for a symbol; unknown symbols are shown raw
    pub fn unit_scale(&self, symbol: &str) -> UnitScale {
        self.get(symbol).map_or(UnitScale::Raw, |a| a.unit_scale)
    }

    /// Price provider id for a symbol, falling back to the symbol itself
    pub fn price_id(&self, symbol: &str) -> String {
        self.get(symbol)
            .map_or_else(|| symbol.to_lowercase(), |a| a.price_id.clone())
    }

    /// Minimal address shape check
    pub fn validate_address(&self, symbol: &str, address: &str) -> Result<()> {
        let asset = self.require(symbol)?;
        if asset.matches_address(address) {
            Ok(())
        } else {
            Err(Error::InvalidAddress {
                asset: asset.symbol.clone(),
                address: address.to_string(),
            })
        }
    }

    /// All registered symbols, sorted
    pub fn symbols(&self) -> Vec<&str> {
        self.assets.keys().map(String::as_str).collect()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scales() {
        let registry = AssetRegistry::builtin();
        assert_eq!(registry.unit_scale("btc"), UnitScale::Decimals(8));
        assert_eq!(registry.unit_scale("LTC"), UnitScale::Decimals(8));
        assert_eq!(registry.unit_scale("eth"), UnitScale::Decimals(18));
        assert_eq!(registry.unit_scale("doge"), UnitScale::Raw);
        assert_eq!(registry.symbols(), vec!["btc", "eth", "ltc"]);
    }

    #[test]
    fn test_format_amounts() {
        assert_eq!(UnitScale::Decimals(8).format(150_000_000), "1.50000000");
        assert_eq!(UnitScale::Decimals(8).format(1), "0.00000001");
        assert_eq!(UnitScale::Decimals(8).format(0), "0.00000000");
        assert_eq!(
            UnitScale::Decimals(18).format(2_500_000_000_000_000_000),
            "2.50000000"
        );
        // 0.000000015 ETH rounds up to 0.00000002
        assert_eq!(UnitScale::Decimals(18).format(15_000_000_000), "0.00000002");
        assert_eq!(UnitScale::Decimals(18).format(14_999_999_999), "0.00000001");
        assert_eq!(UnitScale::Decimals(2).format(12_345), "123.45000000");
        assert_eq!(UnitScale::Raw.format(12_345), "12345");
    }

    #[test]
    fn test_address_shapes() {
        let registry = AssetRegistry::builtin();
        assert!(registry
            .validate_address("btc", "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
            .is_ok());
        assert!(registry
            .validate_address("btc", "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq")
            .is_ok());
        assert!(registry
            .validate_address("eth", "0xde0B295669a9FD93d5F28D9Ec85E40f4cb697BAe")
            .is_ok());
        assert!(registry
            .validate_address("ltc", "LQL9pVH1LsMfKwt82Y2wGhNGkrjF8vwUst")
            .is_ok());

        let err = registry.validate_address("btc", "not-an-address").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));

        let err = registry.validate_address("xmr", "anything").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAsset(_)));
    }

    #[test]
    fn test_overrides_merge_with_builtins() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "BTC".to_string(),
            AssetConfig {
                display_name: Some("Bitcoin Mainnet".to_string()),
                ..Default::default()
            },
        );
        overrides.insert(
            "doge".to_string(),
            AssetConfig {
                decimals: Some(8),
                chain: Some("doge/main".to_string()),
                price_id: Some("dogecoin".to_string()),
                ..Default::default()
            },
        );

        let registry = AssetRegistry::new(&overrides).unwrap();
        let btc = registry.get("btc").unwrap();
        assert_eq!(btc.display_name, "Bitcoin Mainnet");
        assert_eq!(btc.unit_scale, UnitScale::Decimals(8));
        assert_eq!(btc.price_id, "bitcoin");

        assert_eq!(registry.unit_scale("doge"), UnitScale::Decimals(8));
        assert_eq!(registry.price_id("doge"), "dogecoin");
        assert_eq!(registry.get("doge").unwrap().display_name, "DOGE");
        assert!(registry.validate_address("doge", "DAnything").is_ok());
    }

    #[test]
    fn test_price_id_fallback() {
        let registry = AssetRegistry::builtin();
        assert_eq!(registry.price_id("btc"), "bitcoin");
        assert_eq!(registry.price_id("Solana"), "solana");
    }
}
