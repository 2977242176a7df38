//! Error types for the wallet checker

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the wallet checker
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Caller input errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("Invalid {asset} address: {address}")]
    InvalidAddress { asset: String, address: String },

    // Upstream data errors
    #[error("Price feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Wallet source error: {0}")]
    WalletSource(String),

    #[error("HTTP error: {0}")]
    Http(String),

    // Persistence errors
    #[error("Storage corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Export failed: {0}")]
    Export(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from csv errors
impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Export(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: denied");
    }

    #[test]
    fn test_address_error_message() {
        let err = Error::InvalidAddress {
            asset: "btc".into(),
            address: "nope".into(),
        };
        assert_eq!(err.to_string(), "Invalid btc address: nope");
    }
}
