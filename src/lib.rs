//! # rusty_fxrates
//!
//! Foreign-exchange rate pipeline: turn a provider's nested
//! `{date: {symbol: rate}}` payload into a tidy table, re-express it
//! against another base currency, and derive per-symbol signals
//! (percentage change, moving statistics, z-score outliers, RSI).
//!
//! ## Example
//!
//! ```rust
//! use rusty_fxrates::prelude::*;
//!
//! let payload = RawRatePayload::from_json(
//!     r#"{"base": "USD", "rates": {
//!         "2024-01-02": {"EUR": 0.90, "GBP": 0.80},
//!         "2024-01-03": {"EUR": 0.91, "GBP": 0.79}
//!     }}"#,
//! )
//! .unwrap();
//!
//! let table = tidy(&payload, "USD");
//! let in_eur = convert_base(&table, "EUR");
//! assert!(in_eur.advisory.is_none());
//!
//! let augmented = derive_metrics(&in_eur.table);
//! assert_eq!(augmented.len(), 4);
//! ```

pub mod config;
pub mod currency;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::config::{MetricsConfig, PipelineConfig};
    pub use crate::currency::CurrencyCode;
    pub use crate::data::{
        convert_base, tidy, tidy_with_report, Conversion, ConversionAdvisory, InMemoryLoader,
        RateCache, RawRatePayload, TableLoader,
    };
    pub use crate::error::{FxError, Result};
    pub use crate::pipeline::{
        correlation_matrix, derive_metrics, outliers, summarize, PipelineOutput, RatePipeline,
        Selection,
    };
    pub use crate::types::*;
}
