//! Report export (JSON / CSV)

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage;
use crate::wallet::{WalletAnalysis, WalletSnapshot};

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Everything known about one checked wallet
#[derive(Debug, Clone, Serialize)]
pub struct WalletReport {
    pub address: String,
    pub crypto: String,
    pub data: WalletSnapshot,
    pub analysis: WalletAnalysis,
    /// Balance value in fiat, when a price was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiat_value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl WalletReport {
    /// Default export file prefix: `{crypto}_{first 8 chars of address}_report`
    pub fn file_prefix(&self) -> String {
        let short: String = self.address.chars().take(8).collect();
        format!("{}_{}_report", self.crypto, short)
    }
}

/// Flattened single-row CSV layout
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    address: &'a str,
    crypto: &'a str,
    balance: &'a str,
    total_received: &'a str,
    n_tx: u64,
    unconfirmed_n_tx: Option<u64>,
    wallet_type: String,
    tx_per_month: Option<String>,
    risk_factors: Option<String>,
    fiat_value: Option<f64>,
    timestamp: String,
}

impl<'a> From<&'a WalletReport> for CsvRow<'a> {
    fn from(report: &'a WalletReport) -> Self {
        let analysis = &report.analysis;
        Self {
            address: &report.address,
            crypto: &report.crypto,
            balance: &analysis.balance,
            total_received: &analysis.total_received,
            n_tx: analysis.n_tx,
            unconfirmed_n_tx: analysis.unconfirmed_n_tx,
            wallet_type: analysis.wallet_kind.to_string(),
            tx_per_month: analysis.tx_per_month_display(),
            risk_factors: analysis.risk_factors.as_ref().map(|factors| {
                factors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            }),
            fiat_value: report.fiat_value,
            timestamp: report.timestamp.to_rfc3339(),
        }
    }
}

/// Writes reports into a timestamped file under the export directory
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    pub fn new<P: AsRef<Path>>(export_dir: P) -> Self {
        Self {
            export_dir: export_dir.as_ref().to_path_buf(),
        }
    }

    /// Export in the requested format, returning the written path
    pub fn export(&self, report: &WalletReport, format: ExportFormat) -> Result<PathBuf> {
        let prefix = report.file_prefix();
        match format {
            ExportFormat::Json => self.export_json(report, &prefix),
            ExportFormat::Csv => self.export_csv(report, &prefix),
        }
    }

    pub fn export_json(&self, report: &WalletReport, prefix: &str) -> Result<PathBuf> {
        let path = self.target(prefix, "json");
        storage::write_json(&path, report)?;
        info!("Exported JSON report to {}", path.display());
        Ok(path)
    }

    pub fn export_csv(&self, report: &WalletReport, prefix: &str) -> Result<PathBuf> {
        let path = self.target(prefix, "csv");
        std::fs::create_dir_all(&self.export_dir)
            .map_err(|e| Error::Export(format!("{}: {}", self.export_dir.display(), e)))?;

        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.serialize(CsvRow::from(report))?;
        wtr.flush()?;

        info!("Exported CSV report to {}", path.display());
        Ok(path)
    }

    fn target(&self, prefix: &str, ext: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        self.export_dir.join(format!("{}_{}.{}", prefix, stamp, ext))
    }
}
