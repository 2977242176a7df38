//! CLI command implementations

use anyhow::{Context, Result};
use dialoguer::Confirm;
use std::time::Duration;
use tracing::{info, warn};

use crate::alert::{AlertEvaluator, AlertId, AlertStore};
use crate::asset::AssetRegistry;
use crate::config::Config;
use crate::export::{ExportFormat, Exporter, WalletReport};
use crate::favorites::FavoritesStore;
use crate::history::HistoryLog;
use crate::price::{CachedPriceSource, CoinGeckoFeed, PriceSource};
use crate::wallet::{BlockCypherClient, WalletClassifier, WalletSource};

fn asset_registry(config: &Config) -> Result<AssetRegistry> {
    AssetRegistry::new(&config.assets).context("Failed to build asset registry")
}

/// Truncate long strings for table columns
fn shorten(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Check a wallet: balances, analysis, optional export
pub async fn check(
    config: &Config,
    address: &str,
    crypto: &str,
    export: Option<ExportFormat>,
) -> Result<()> {
    let assets = asset_registry(config)?;
    let crypto = crypto.to_lowercase();
    let asset = assets.require(&crypto)?.clone();

    let mut history = HistoryLog::load(&config.storage.history_file, config.storage.history_limit);
    if let Err(e) = history.add_search(address, &crypto) {
        warn!("Could not record search in history: {}", e);
    }

    let source = BlockCypherClient::new(&config.api, assets.clone())?;
    info!("Checking {} wallet {} via {}", crypto, address, source.name());
    let snapshot = source
        .fetch_snapshot(address, &crypto)
        .await
        .with_context(|| format!("Failed to fetch {} wallet {}", crypto, address))?;

    let feed = CachedPriceSource::new(
        CoinGeckoFeed::new(&config.api, assets.clone())?,
        Duration::from_secs(config.api.price_cache_ttl_secs),
    );
    let fiat_value = match feed.current_price(&crypto).await {
        Ok(price) => Some(asset.unit_scale.to_major(snapshot.balance) * price),
        Err(e) => {
            warn!("Fiat value unavailable: {}", e);
            None
        }
    };

    let analysis = WalletClassifier::new(assets).analyze(&snapshot);

    println!("\n=== {} WALLET ===\n", asset.display_name.to_uppercase());
    println!("Address: {}", address);
    println!("Balance: {}", analysis.balance);
    if let Some(value) = fiat_value {
        println!("Value: {:.2} {}", value, config.api.fiat.to_uppercase());
    }
    println!("Total received: {}", analysis.total_received);
    println!("Transactions: {}", analysis.n_tx);

    println!("\nWallet analysis:");
    for (label, value) in analysis.rows() {
        println!("- {}: {}", label, value);
    }

    if let Some(format) = export {
        let report = WalletReport {
            address: address.to_string(),
            crypto: crypto.clone(),
            data: snapshot,
            analysis,
            fiat_value,
            timestamp: chrono::Utc::now(),
        };
        let path = Exporter::new(&config.storage.export_dir)
            .export(&report, format)
            .context("Export failed")?;
        println!("\nData exported to: {}", path.display());
    }

    println!();
    Ok(())
}

/// Add a wallet to favorites
pub fn favorite_add(
    config: &Config,
    name: &str,
    address: &str,
    crypto: &str,
    notes: &str,
) -> Result<()> {
    let assets = asset_registry(config)?;
    assets.validate_address(crypto, address)?;

    let mut favorites = FavoritesStore::load(&config.storage.favorites_file);
    if favorites.add(name, address, crypto, notes)? {
        println!("Wallet {} added to favorites.", name);
    } else {
        println!("Wallet is already in favorites.");
    }
    Ok(())
}

/// Remove a wallet from favorites
pub fn favorite_remove(config: &Config, address: &str) -> Result<()> {
    let mut favorites = FavoritesStore::load(&config.storage.favorites_file);
    if favorites.remove(address)? {
        println!("Wallet removed from favorites.");
    } else {
        println!("Wallet not found in favorites.");
    }
    Ok(())
}

/// List favorite wallets
pub fn favorite_list(config: &Config) -> Result<()> {
    let favorites = FavoritesStore::load(&config.storage.favorites_file);
    let list = favorites.list();

    if list.is_empty() {
        println!("No favorite wallets.");
        return Ok(());
    }

    println!("\n=== FAVORITE WALLETS ===\n");
    println!("{:<20} {:<6} {:<46} {}", "NAME", "CRYPTO", "ADDRESS", "NOTES");
    println!("{}", "-".repeat(90));

    for (address, fav) in list {
        println!(
            "{:<20} {:<6} {:<46} {}",
            shorten(&fav.name, 17),
            fav.crypto.to_uppercase(),
            shorten(address, 43),
            fav.notes
        );
    }

    println!();
    Ok(())
}

/// Show or clear the search history
pub fn history(config: &Config, limit: usize, clear: bool, force: bool) -> Result<()> {
    let mut history = HistoryLog::load(&config.storage.history_file, config.storage.history_limit);

    if clear {
        if !force {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete all {} history entries?", history.len()))
                .default(false)
                .interact()?;

            if !confirmed {
                info!("History clear cancelled by user");
                return Ok(());
            }
        }
        history.clear()?;
        println!("Search history cleared.");
        return Ok(());
    }

    let recent = history.recent(limit);
    if recent.is_empty() {
        println!("No search history.");
        return Ok(());
    }

    println!("\n=== RECENT SEARCHES ===\n");
    println!("{:<4} {:<20} {:<6} {}", "#", "DATE", "CRYPTO", "ADDRESS");
    println!("{}", "-".repeat(80));

    for (i, entry) in recent.iter().enumerate() {
        println!(
            "{:<4} {:<20} {:<6} {}",
            i + 1,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.crypto.to_uppercase(),
            entry.address
        );
    }

    println!();
    Ok(())
}

/// Create a price alert
pub fn alert_add(
    config: &Config,
    crypto: &str,
    price: f64,
    condition: &str,
    note: &str,
) -> Result<()> {
    let mut store = AlertStore::load(&config.storage.alerts_file);
    let id = store.add(crypto, price, condition, note)?;

    println!(
        "Alert {} created: {} {} {} {}",
        id,
        crypto.to_uppercase(),
        condition.to_lowercase(),
        price,
        config.api.fiat.to_uppercase()
    );
    Ok(())
}

/// List alerts (pending only unless `all`)
pub fn alert_list(config: &Config, all: bool) -> Result<()> {
    let store = AlertStore::load(&config.storage.alerts_file);
    if store.recovered_from_corrupt() {
        warn!(
            "Alert file {} could not be read; showing an empty list",
            store.path().display()
        );
    }

    let alerts = store.list(all);
    if alerts.is_empty() {
        println!("No {}alerts.", if all { "" } else { "pending " });
        return Ok(());
    }

    println!("\n=== PRICE ALERTS ===\n");
    println!(
        "{:<5} {:<8} {:<7} {:<14} {:<20} {}",
        "ID", "CRYPTO", "WHEN", "TARGET", "CREATED", "STATUS"
    );
    println!("{}", "-".repeat(80));

    for (id, alert) in alerts {
        let status = match (alert.triggered_at, alert.triggered_price) {
            (Some(at), Some(price)) => format!("fired {} @ {}", at.format("%Y-%m-%d %H:%M"), price),
            _ => "pending".to_string(),
        };
        println!(
            "{:<5} {:<8} {:<7} {:<14} {:<20} {}",
            id,
            alert.crypto.to_uppercase(),
            alert.condition,
            alert.price,
            alert.created_at.format("%Y-%m-%d %H:%M:%S"),
            status
        );
        if !alert.note.is_empty() {
            println!("      note: {}", alert.note);
        }
    }

    println!();
    Ok(())
}

/// Delete an alert
pub fn alert_remove(config: &Config, id: AlertId) -> Result<()> {
    let mut store = AlertStore::load(&config.storage.alerts_file);
    if store.remove(id)? {
        println!("Alert {} removed.", id);
    } else {
        println!("Alert not found.");
    }
    Ok(())
}

/// Evaluate all pending alerts once against live prices
pub async fn alert_check(config: &Config) -> Result<()> {
    let assets = asset_registry(config)?;
    let feed = CoinGeckoFeed::new(&config.api, assets)?;
    let mut store = AlertStore::load(&config.storage.alerts_file);
    if store.recovered_from_corrupt() {
        warn!(
            "Alert file {} could not be read; no alerts to check",
            store.path().display()
        );
    }

    let pending = store.pending_ids().len();
    info!("Checking {} pending alerts", pending);

    let fired = AlertEvaluator::new(&mut store, &feed)
        .check_all()
        .await
        .context("Failed to save triggered alerts")?;

    if fired.is_empty() {
        println!("No alerts triggered ({} pending).", pending);
        return Ok(());
    }

    println!("\n=== TRIGGERED ALERTS ===\n");
    for f in &fired {
        println!(
            "Alert {}: {} is {} {} {} (now {})",
            f.id,
            f.alert.crypto.to_uppercase(),
            f.alert.condition,
            f.alert.price,
            feed.fiat().to_uppercase(),
            f.alert.triggered_price.unwrap_or_default()
        );
        if !f.alert.note.is_empty() {
            println!("  note: {}", f.alert.note);
        }
    }

    println!();
    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    let assets = asset_registry(config)?;

    println!("{}", config.masked_display());
    println!("Assets:");
    for symbol in assets.symbols() {
        if let Some(asset) = assets.get(symbol) {
            println!(
                "  {:<6} {:<12} scale={:?} price_id={}",
                symbol, asset.display_name, asset.unit_scale, asset.price_id
            );
        }
    }
    Ok(())
}
