//! Foreign exchange (FX) base re-denomination
//!
//! Converts a tidy rate table quoted against one base currency into the
//! same table quoted against another currency present in it.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rusty_fxrates::data::fx::convert_base;
//! use rusty_fxrates::types::{TidyRow, TidyTable};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let table = TidyTable::from_rows(vec![
//!     TidyRow::new(day, "USD", "EUR", 0.90),
//!     TidyRow::new(day, "USD", "GBP", 0.80),
//! ]);
//!
//! let converted = convert_base(&table, "EUR");
//! assert!(converted.advisory.is_none());
//! assert!(converted.table.iter().all(|r| r.base == "EUR"));
//! ```

pub mod convert;

pub use convert::{convert_base, Conversion, ConversionAdvisory};
