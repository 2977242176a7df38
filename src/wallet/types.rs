//! Core types for wallet analysis
//!
//! Defines the raw activity snapshot and the analysis derived from it.

use serde::{Deserialize, Serialize, Serializer};

/// Raw address activity, as supplied by a wallet source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Asset symbol, lowercase: "btc"
    pub symbol: String,

    /// Current balance in the smallest unit
    pub balance: u128,

    /// Total ever received in the smallest unit
    pub total_received: u128,

    /// Number of transactions
    pub n_tx: u64,

    /// First transaction time (epoch seconds)
    #[serde(default)]
    pub first_tx_time: Option<i64>,

    /// Unconfirmed transactions, when the source reports them
    #[serde(default)]
    pub unconfirmed_n_tx: Option<u64>,
}

impl WalletSnapshot {
    /// Snapshot with no optional fields set
    pub fn new(symbol: &str, balance: u128, total_received: u128, n_tx: u64) -> Self {
        Self {
            symbol: symbol.to_lowercase(),
            balance,
            total_received,
            n_tx,
            first_tx_time: None,
            unconfirmed_n_tx: None,
        }
    }

    pub fn with_first_tx_time(mut self, epoch_secs: i64) -> Self {
        self.first_tx_time = Some(epoch_secs);
        self
    }

    pub fn with_unconfirmed(mut self, count: u64) -> Self {
        self.unconfirmed_n_tx = Some(count);
        self
    }
}

/// Heuristic wallet usage label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletKind {
    /// No transactions yet
    #[serde(rename = "new wallet")]
    New,

    /// Very high volume or large inflows
    #[serde(rename = "exchange/institutional wallet")]
    ExchangeOrInstitutional,

    /// More than a hundred transactions
    #[serde(rename = "frequent-use wallet")]
    FrequentUse,

    /// Everything else
    #[serde(rename = "personal-use wallet")]
    PersonalUse,
}

impl std::fmt::Display for WalletKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletKind::New => write!(f, "new wallet"),
            WalletKind::ExchangeOrInstitutional => write!(f, "exchange/institutional wallet"),
            WalletKind::FrequentUse => write!(f, "frequent-use wallet"),
            WalletKind::PersonalUse => write!(f, "personal-use wallet"),
        }
    }
}

/// Risk flag raised by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskFactor {
    #[serde(rename = "inactive wallet")]
    Inactive,

    #[serde(rename = "emptied wallet")]
    Emptied,
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskFactor::Inactive => write!(f, "inactive wallet"),
            RiskFactor::Emptied => write!(f, "emptied wallet"),
        }
    }
}

/// Result of analyzing one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletAnalysis {
    /// Current balance, formatted with the asset symbol
    pub balance: String,

    /// Total received, formatted with the asset symbol
    pub total_received: String,

    pub n_tx: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unconfirmed_n_tx: Option<u64>,

    pub wallet_kind: WalletKind,

    /// Transactions per active month
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_rate"
    )]
    pub tx_per_month: Option<f64>,

    /// Never `Some(vec![])`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<Vec<RiskFactor>>,
}

impl WalletAnalysis {
    /// Monthly rate as reported: one decimal place
    pub fn tx_per_month_display(&self) -> Option<String> {
        self.tx_per_month.map(|rate| format!("{:.1}", rate))
    }

    /// Risk factors joined for display
    pub fn risk_factors_display(&self) -> Option<String> {
        self.risk_factors.as_ref().map(|factors| {
            factors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })
    }

    /// Labelled rows in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Current balance", self.balance.clone()),
            ("Total received", self.total_received.clone()),
            ("Transactions", self.n_tx.to_string()),
        ];
        if let Some(unconfirmed) = self.unconfirmed_n_tx {
            rows.push(("Unconfirmed transactions", unconfirmed.to_string()));
        }
        rows.push(("Wallet type", self.wallet_kind.to_string()));
        if let Some(rate) = self.tx_per_month_display() {
            rows.push(("Transactions/month", rate));
        }
        if let Some(risks) = self.risk_factors_display() {
            rows.push(("Risk factors", risks));
        }
        rows
    }
}

fn serialize_rate<S: Serializer>(rate: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match rate {
        Some(r) => serializer.serialize_str(&format!("{:.1}", r)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_serialized_form() {
        let json = serde_json::to_string(&WalletKind::ExchangeOrInstitutional).unwrap();
        assert_eq!(json, r#""exchange/institutional wallet""#);
        assert_eq!(WalletKind::PersonalUse.to_string(), "personal-use wallet");

        let json = serde_json::to_string(&RiskFactor::Emptied).unwrap();
        assert_eq!(json, r#""emptied wallet""#);
    }

    #[test]
    fn test_analysis_omits_absent_fields() {
        let analysis = WalletAnalysis {
            balance: "0.10000000 BTC".to_string(),
            total_received: "0.20000000 BTC".to_string(),
            n_tx: 4,
            unconfirmed_n_tx: None,
            wallet_kind: WalletKind::PersonalUse,
            tx_per_month: Some(1.3333),
            risk_factors: None,
        };

        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["tx_per_month"], "1.3");
        assert!(value.get("risk_factors").is_none());
        assert!(value.get("unconfirmed_n_tx").is_none());

        let labels: Vec<&str> = analysis.rows().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "Current balance",
                "Total received",
                "Transactions",
                "Wallet type",
                "Transactions/month"
            ]
        );
    }
}
