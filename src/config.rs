//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Asset overrides and additions, merged over the built-in registry
    #[serde(default)]
    pub assets: HashMap<String, AssetConfig>,
}

/// External data providers
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_blockcypher_url")]
    pub blockcypher_url: String,
    #[serde(default = "default_coingecko_url")]
    pub coingecko_url: String,
    /// Fiat currency prices are quoted in
    #[serde(default = "default_fiat")]
    pub fiat: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How long a fetched fiat price is reused by the `check` command
    #[serde(default = "default_price_cache_ttl_secs")]
    pub price_cache_ttl_secs: u64,
}

/// Local persistence paths
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_alerts_file")]
    pub alerts_file: String,
    #[serde(default = "default_favorites_file")]
    pub favorites_file: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
    /// Maximum number of searches kept in history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

/// Per-asset settings (see `asset::AssetRegistry`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetConfig {
    #[serde(default)]
    pub display_name: Option<String>,
    /// Decimal places of the smallest unit; `None` means amounts are shown raw
    #[serde(default)]
    pub decimals: Option<u32>,
    /// BlockCypher chain path, e.g. "btc/main"
    #[serde(default)]
    pub chain: Option<String>,
    /// Price provider coin id, e.g. "bitcoin"
    #[serde(default)]
    pub price_id: Option<String>,
    /// Regex an address must match before any lookup
    #[serde(default)]
    pub address_pattern: Option<String>,
}

fn default_blockcypher_url() -> String {
    "https://api.blockcypher.com/v1".to_string()
}

fn default_coingecko_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_fiat() -> String {
    "usd".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_price_cache_ttl_secs() -> u64 {
    60
}

fn default_alerts_file() -> String {
    "data/price_alerts.json".to_string()
}

fn default_favorites_file() -> String {
    "data/favorites/favorites.json".to_string()
}

fn default_history_file() -> String {
    "data/history/history.json".to_string()
}

fn default_history_limit() -> usize {
    1000
}

fn default_export_dir() -> String {
    "data/exports".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            blockcypher_url: default_blockcypher_url(),
            coingecko_url: default_coingecko_url(),
            fiat: default_fiat(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            price_cache_ttl_secs: default_price_cache_ttl_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            alerts_file: default_alerts_file(),
            favorites_file: default_favorites_file(),
            history_file: default_history_file(),
            history_limit: default_history_limit(),
            export_dir: default_export_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("api.blockcypher_url", default_blockcypher_url())?
            .set_default("api.coingecko_url", default_coingecko_url())?
            .set_default("api.fiat", default_fiat())?
            .set_default("api.timeout_ms", default_timeout_ms() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix WALLET_CHECKER_)
            .add_source(
                config::Environment::with_prefix("WALLET_CHECKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.api.timeout_ms == 0 {
            anyhow::bail!("api.timeout_ms must be positive");
        }

        if self.api.fiat.trim().is_empty() {
            anyhow::bail!("api.fiat cannot be empty");
        }

        for (symbol, asset) in &self.assets {
            if let Some(decimals) = asset.decimals {
                // 10^38 is the largest power of ten that fits in u128
                if decimals > 38 {
                    anyhow::bail!("assets.{}.decimals cannot exceed 38, got {}", symbol, decimals);
                }
            }

            if let Some(pattern) = &asset.address_pattern {
                regex::Regex::new(pattern).with_context(|| {
                    format!("Invalid assets.{}.address_pattern regex: {}", symbol, pattern)
                })?;
            }
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        let mut assets: Vec<&String> = self.assets.keys().collect();
        assets.sort();

        format!(
            r#"Configuration:
  API:
    blockcypher: {}
    coingecko: {}
    fiat: {}
    timeout: {}ms
    price_cache_ttl: {}s
  Storage:
    alerts: {}
    favorites: {}
    history: {} (max {} entries)
    exports: {}
  Asset overrides: {:?}
"#,
            mask_url(&self.api.blockcypher_url),
            mask_url(&self.api.coingecko_url),
            self.api.fiat,
            self.api.timeout_ms,
            self.api.price_cache_ttl_secs,
            self.storage.alerts_file,
            self.storage.favorites_file,
            self.storage.history_file,
            self.storage.history_limit,
            self.storage.export_dir,
            assets,
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            assets: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.fiat, "usd");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.storage.alerts_file, "data/price_alerts.json");
        assert!(config.assets.is_empty());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.coingecko_url, default_coingecko_url());
        assert_eq!(config.storage.history_limit, 1000);
    }

    #[test]
    fn test_load_asset_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
fiat = "eur"

[assets.doge]
display_name = "Dogecoin"
decimals = 8
chain = "doge/main"
price_id = "dogecoin"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.fiat, "eur");
        let doge = config.assets.get("doge").unwrap();
        assert_eq!(doge.decimals, Some(8));
        assert_eq!(doge.price_id.as_deref(), Some("dogecoin"));
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let mut config = Config::default();
        config.assets.insert(
            "btc".to_string(),
            AssetConfig {
                address_pattern: Some("([unclosed".to_string()),
                ..Default::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_decimals() {
        let mut config = Config::default();
        config.assets.insert(
            "xyz".to_string(),
            AssetConfig {
                decimals: Some(39),
                ..Default::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(
            mask_url("https://api.example.com"),
            "https://api.example.com"
        );
    }
}
