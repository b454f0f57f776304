//! Pipeline configuration
//!
//! Defaults that used to be module-wide constants (base currency, symbol
//! set, window sizes) travel as an explicit [`PipelineConfig`] value, so
//! independent pipelines with different settings can coexist.

use crate::currency::CurrencyCode;
use crate::error::{FxError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Allowed range for `history_days`
pub const HISTORY_DAYS_RANGE: std::ops::RangeInclusive<u32> = 7..=365;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base currency requested from the rate source
    pub default_base: String,
    /// Symbols requested from the rate source
    pub default_symbols: Vec<String>,
    /// Days of history to fetch
    pub history_days: u32,
    /// Directory holding the CSV cache
    pub data_dir: PathBuf,
    /// Number of symbols shown when the caller selects none
    pub default_view_count: usize,
    /// Rate source endpoint
    pub source_url: String,
    pub metrics: MetricsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_base: "USD".to_string(),
            default_symbols: ["EUR", "GBP", "JPY", "MXN", "ARS", "BRL", "CLP", "COP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            history_days: 90,
            data_dir: default_data_dir(),
            default_view_count: 4,
            source_url: "https://api.frankfurter.app".to_string(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Window and threshold settings for the metrics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Trailing window for `ma7` / `std7`
    pub ma_window: usize,
    /// Defined samples required before `ma7` / `std7` are reported
    pub ma_min_periods: usize,
    /// Trailing window for the pct-change z-score
    pub z_window: usize,
    /// Defined pct-change values required for a z-score
    pub z_min_periods: usize,
    /// `|z|` above this flags an outlier
    pub outlier_threshold: f64,
    /// RSI period; smoothing factor is `1 / rsi_period`
    pub rsi_period: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            ma_window: 7,
            ma_min_periods: 3,
            z_window: 14,
            z_min_periods: 5,
            outlier_threshold: 2.5,
            rsi_period: 14,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("ma", self.ma_window, self.ma_min_periods)?;
        check_window("z", self.z_window, self.z_min_periods)?;
        if self.rsi_period == 0 {
            return Err(FxError::ConfigError("rsi_period must be at least 1".to_string()));
        }
        if !(self.outlier_threshold.is_finite() && self.outlier_threshold > 0.0) {
            return Err(FxError::ConfigError(format!(
                "outlier_threshold must be positive, got {}",
                self.outlier_threshold
            )));
        }
        Ok(())
    }
}

fn check_window(name: &str, window: usize, min_periods: usize) -> Result<()> {
    if window == 0 || min_periods == 0 {
        return Err(FxError::ConfigError(format!(
            "{name}_window and {name}_min_periods must be at least 1"
        )));
    }
    if min_periods > window {
        return Err(FxError::ConfigError(format!(
            "{name}_min_periods ({min_periods}) exceeds {name}_window ({window})"
        )));
    }
    Ok(())
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fx-rates")
        .join("data")
}

/// Default config file location (`~/.fx-rates/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".fx-rates").join("config.toml"))
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        CurrencyCode::parse(&self.default_base)?;
        for symbol in &self.default_symbols {
            CurrencyCode::parse(symbol)?;
        }
        if !HISTORY_DAYS_RANGE.contains(&self.history_days) {
            return Err(FxError::ConfigError(format!(
                "history_days must be within {}..={}, got {}",
                HISTORY_DAYS_RANGE.start(),
                HISTORY_DAYS_RANGE.end(),
                self.history_days
            )));
        }
        self.metrics.validate()
    }

    /// Default base as a validated code
    pub fn base_code(&self) -> Result<CurrencyCode> {
        CurrencyCode::parse(&self.default_base)
    }

    /// Default symbols as validated codes
    pub fn symbol_codes(&self) -> Result<Vec<CurrencyCode>> {
        self.default_symbols
            .iter()
            .map(|s| CurrencyCode::parse(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_base, "USD");
        assert_eq!(config.default_symbols.len(), 8);
        assert_eq!(config.metrics.ma_window, 7);
        assert_eq!(config.metrics.rsi_period, 14);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            default_base = "EUR"
            history_days = 30

            [metrics]
            outlier_threshold = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.default_base, "EUR");
        assert_eq!(config.history_days, 30);
        assert_eq!(config.metrics.outlier_threshold, 3.0);
        assert_eq!(config.metrics.z_window, 14);
        assert_eq!(config.default_view_count, 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(PipelineConfig::from_toml_str("history_days = 3").is_err());
        assert!(PipelineConfig::from_toml_str("default_base = \"DOLLAR\"").is_err());
        assert!(PipelineConfig::from_toml_str("[metrics]\nma_min_periods = 9").is_err());
        assert!(PipelineConfig::from_toml_str("[metrics]\nrsi_period = 0").is_err());
        assert!(PipelineConfig::from_toml_str("history_days = \"many\"").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = PipelineConfig::load(Some(Path::new("/nonexistent/fx-rates.toml"))).unwrap();
        assert_eq!(config.history_days, 90);
    }
}
