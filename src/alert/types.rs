//! Price alert types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Alert identifier
pub type AlertId = u64;

/// Direction of a price trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    /// Fires when price >= target
    Above,
    /// Fires when price <= target
    Below,
}

impl AlertCondition {
    /// Inclusive comparison: touching the target counts
    pub fn is_met(&self, current_price: f64, target_price: f64) -> bool {
        match self {
            AlertCondition::Above => current_price >= target_price,
            AlertCondition::Below => current_price <= target_price,
        }
    }
}

impl FromStr for AlertCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            other => Err(Error::InvalidArgument(format!(
                "condition must be 'above' or 'below', got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "above"),
            AlertCondition::Below => write!(f, "below"),
        }
    }
}

/// A persisted price alert
///
/// `triggered_at`/`triggered_price` are set exactly when `triggered` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Asset symbol, lowercase
    pub crypto: String,

    /// Target price in the configured fiat currency
    pub price: f64,

    pub condition: AlertCondition,

    #[serde(default)]
    pub note: String,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub triggered: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_price: Option<f64>,
}

impl Alert {
    /// New pending alert
    pub fn new(crypto: &str, price: f64, condition: AlertCondition, note: &str) -> Self {
        Self {
            crypto: crypto.trim().to_lowercase(),
            price,
            condition,
            note: note.to_string(),
            created_at: Utc::now(),
            triggered: false,
            triggered_at: None,
            triggered_price: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.triggered
    }

    /// Whether `current_price` satisfies this alert's condition
    pub fn should_fire(&self, current_price: f64) -> bool {
        self.is_pending() && self.condition.is_met(current_price, self.price)
    }

    /// Pending -> triggered. No-op on an already triggered alert.
    pub fn mark_triggered(&mut self, observed_price: f64, at: DateTime<Utc>) -> bool {
        if self.triggered {
            return false;
        }
        self.triggered = true;
        self.triggered_at = Some(at);
        self.triggered_price = Some(observed_price);
        true
    }
}

/// An alert that transitioned to triggered during an evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct FiredAlert {
    pub id: AlertId,
    pub alert: Alert,
}
