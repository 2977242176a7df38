//! Wallet activity classifier
//!
//! Turns a raw activity snapshot into a qualitative assessment: formatted
//! balances, wallet type, monthly transaction rate and risk flags.
//! Pure and deterministic given the reference time; never fails.

use chrono::{DateTime, Datelike, Utc};

use crate::asset::AssetRegistry;

use super::types::{RiskFactor, WalletAnalysis, WalletKind, WalletSnapshot};

/// Transaction count above which a wallet is treated as exchange/institutional
const EXCHANGE_TX_THRESHOLD: u64 = 1000;
/// Transaction count above which a wallet is treated as frequent-use
const FREQUENT_TX_THRESHOLD: u64 = 100;

/// Classifies wallet activity snapshots
#[derive(Debug, Clone, Default)]
pub struct WalletClassifier {
    assets: AssetRegistry,
}

impl WalletClassifier {
    pub fn new(assets: AssetRegistry) -> Self {
        Self { assets }
    }

    /// Analyze a snapshot against the current time
    pub fn analyze(&self, snapshot: &WalletSnapshot) -> WalletAnalysis {
        self.analyze_at(snapshot, Utc::now())
    }

    /// Analyze a snapshot against a fixed reference time
    pub fn analyze_at(&self, snapshot: &WalletSnapshot, now: DateTime<Utc>) -> WalletAnalysis {
        let symbol = snapshot.symbol.to_uppercase();
        let scale = self.assets.unit_scale(&snapshot.symbol);

        WalletAnalysis {
            balance: format!("{} {}", scale.format(snapshot.balance), symbol),
            total_received: format!("{} {}", scale.format(snapshot.total_received), symbol),
            n_tx: snapshot.n_tx,
            unconfirmed_n_tx: snapshot.unconfirmed_n_tx,
            wallet_kind: self.wallet_kind(snapshot),
            tx_per_month: monthly_rate(snapshot, now),
            risk_factors: risk_factors(snapshot),
        }
    }

    /// First matching rule wins
    fn wallet_kind(&self, snapshot: &WalletSnapshot) -> WalletKind {
        let one_unit = self.assets.unit_scale(&snapshot.symbol).factor();

        if snapshot.n_tx == 0 {
            WalletKind::New
        } else if snapshot.n_tx > EXCHANGE_TX_THRESHOLD || snapshot.total_received > one_unit {
            WalletKind::ExchangeOrInstitutional
        } else if snapshot.n_tx > FREQUENT_TX_THRESHOLD {
            WalletKind::FrequentUse
        } else {
            WalletKind::PersonalUse
        }
    }
}

/// Calendar months between two instants, floored at 1
pub fn months_active(first: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let months = i64::from(now.year() - first.year()) * 12
        + (i64::from(now.month()) - i64::from(first.month()));
    months.max(1)
}

fn monthly_rate(snapshot: &WalletSnapshot, now: DateTime<Utc>) -> Option<f64> {
    if snapshot.n_tx == 0 {
        return None;
    }

    let first = snapshot
        .first_tx_time
        .filter(|&ts| ts != 0)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))?;

    Some(snapshot.n_tx as f64 / months_active(first, now) as f64)
}

fn risk_factors(snapshot: &WalletSnapshot) -> Option<Vec<RiskFactor>> {
    let mut factors = Vec::new();

    if snapshot.n_tx == 0 {
        factors.push(RiskFactor::Inactive);
    }
    if snapshot.balance == 0 && snapshot.total_received > 0 {
        factors.push(RiskFactor::Emptied);
    }

    if factors.is_empty() {
        None
    } else {
        Some(factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn classifier() -> WalletClassifier {
        WalletClassifier::new(AssetRegistry::builtin())
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_wallet_is_inactive() {
        let snapshot = WalletSnapshot::new("btc", 0, 0, 0).with_first_tx_time(1_600_000_000);
        let analysis = classifier().analyze_at(&snapshot, at(2024, 6, 1));

        assert_eq!(analysis.wallet_kind, WalletKind::New);
        assert_eq!(analysis.risk_factors, Some(vec![RiskFactor::Inactive]));
        assert_eq!(analysis.tx_per_month, None);
        assert_eq!(analysis.balance, "0.00000000 BTC");
    }

    #[test]
    fn test_new_wallet_with_dust_received_has_both_flags() {
        // n_tx == 0 precedes the "received > 1 unit" rule
        let snapshot = WalletSnapshot::new("btc", 0, 500_000_000, 0);
        let analysis = classifier().analyze_at(&snapshot, at(2024, 6, 1));

        assert_eq!(analysis.wallet_kind, WalletKind::New);
        assert_eq!(
            analysis.risk_factors,
            Some(vec![RiskFactor::Inactive, RiskFactor::Emptied])
        );
    }

    #[test]
    fn test_emptied_wallet() {
        let snapshot = WalletSnapshot::new("ltc", 0, 25_000_000, 12);
        let analysis = classifier().analyze_at(&snapshot, at(2024, 6, 1));

        assert_eq!(analysis.risk_factors, Some(vec![RiskFactor::Emptied]));
        assert_eq!(analysis.wallet_kind, WalletKind::PersonalUse);
        assert_eq!(analysis.total_received, "0.25000000 LTC");
    }

    #[test]
    fn test_wallet_kind_precedence() {
        let c = classifier();
        let now = at(2024, 6, 1);

        let busy = WalletSnapshot::new("btc", 10, 10, 1001);
        assert_eq!(c.analyze_at(&busy, now).wallet_kind, WalletKind::ExchangeOrInstitutional);

        // Large inflow beats the frequent-use rule
        let whale = WalletSnapshot::new("btc", 10, 100_000_001, 5);
        assert_eq!(c.analyze_at(&whale, now).wallet_kind, WalletKind::ExchangeOrInstitutional);

        // Exactly one coin received is not "more than one"
        let one_coin = WalletSnapshot::new("btc", 10, 100_000_000, 5);
        assert_eq!(c.analyze_at(&one_coin, now).wallet_kind, WalletKind::PersonalUse);

        let frequent = WalletSnapshot::new("btc", 10, 10, 101);
        assert_eq!(c.analyze_at(&frequent, now).wallet_kind, WalletKind::FrequentUse);

        let boundary = WalletSnapshot::new("btc", 10, 10, 100);
        assert_eq!(c.analyze_at(&boundary, now).wallet_kind, WalletKind::PersonalUse);
    }

    #[test]
    fn test_inflow_threshold_uses_asset_scale() {
        let c = classifier();
        let now = at(2024, 6, 1);

        // 0.5 ETH in wei: would exceed 1e8 raw, but not one ether
        let half_eth = WalletSnapshot::new("eth", 1, 500_000_000_000_000_000, 3);
        let analysis = c.analyze_at(&half_eth, now);
        assert_eq!(analysis.wallet_kind, WalletKind::PersonalUse);
        assert_eq!(analysis.balance, "0.00000000 ETH");
        assert_eq!(analysis.total_received, "0.50000000 ETH");

        // Unknown assets are unscaled
        let doge = WalletSnapshot::new("doge", 7, 2, 3);
        let analysis = c.analyze_at(&doge, now);
        assert_eq!(analysis.wallet_kind, WalletKind::ExchangeOrInstitutional);
        assert_eq!(analysis.balance, "7 DOGE");
    }

    #[test]
    fn test_monthly_rate() {
        let c = classifier();
        let first = at(2023, 1, 15).timestamp();

        let snapshot = WalletSnapshot::new("btc", 1, 1, 17).with_first_tx_time(first);
        let analysis = c.analyze_at(&snapshot, at(2024, 6, 1));
        // 17 months: Jan 2023 -> Jun 2024
        assert_eq!(analysis.tx_per_month, Some(1.0));
        assert_eq!(analysis.tx_per_month_display().as_deref(), Some("1.0"));

        let snapshot = WalletSnapshot::new("btc", 1, 1, 10).with_first_tx_time(first);
        let analysis = c.analyze_at(&snapshot, at(2023, 4, 1));
        assert_eq!(analysis.tx_per_month_display().as_deref(), Some("3.3"));
    }

    #[test]
    fn test_monthly_rate_floors_to_one_month() {
        let c = classifier();
        let snapshot =
            WalletSnapshot::new("btc", 1, 1, 9).with_first_tx_time(at(2024, 6, 2).timestamp());

        // Same calendar month
        let analysis = c.analyze_at(&snapshot, at(2024, 6, 20));
        assert_eq!(analysis.tx_per_month, Some(9.0));

        // First transaction "in the future" relative to now still floors to 1
        let analysis = c.analyze_at(&snapshot, at(2024, 3, 1));
        assert_eq!(analysis.tx_per_month, Some(9.0));
    }

    #[test]
    fn test_monthly_rate_requires_timestamp() {
        let c = classifier();
        let now = at(2024, 6, 1);

        let missing = WalletSnapshot::new("btc", 1, 1, 9);
        assert_eq!(c.analyze_at(&missing, now).tx_per_month, None);

        let zero = WalletSnapshot::new("btc", 1, 1, 9).with_first_tx_time(0);
        assert_eq!(c.analyze_at(&zero, now).tx_per_month, None);
    }

    #[test]
    fn test_unconfirmed_copied_and_no_risk() {
        let snapshot = WalletSnapshot::new("btc", 5, 5, 2).with_unconfirmed(3);
        let analysis = classifier().analyze_at(&snapshot, at(2024, 6, 1));

        assert_eq!(analysis.unconfirmed_n_tx, Some(3));
        assert_eq!(analysis.risk_factors, None);
    }

    #[test]
    fn test_months_active() {
        assert_eq!(months_active(at(2020, 11, 1), at(2021, 2, 1)), 3);
        assert_eq!(months_active(at(2021, 2, 1), at(2021, 2, 28)), 1);
    }
}
