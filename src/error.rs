//! Error types for rusty_fxrates

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rusty_fxrates
///
/// Data-shape problems inside the transformation core never surface here;
/// they degrade to empty tables, advisories or undefined cells. These
/// variants cover the I/O boundaries (cache, fetch, config) and the
/// cross-symbol computations that require a single base.
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Table mixes base currencies: {bases:?}")]
    MixedBases { bases: Vec<String> },

    #[error("No rate cache found at {0}")]
    CacheNotFound(PathBuf),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for rusty_fxrates operations
pub type Result<T> = std::result::Result<T, FxError>;
