//! Rate data handling: payload model, tidy transformer, FX conversion,
//! CSV cache and external sources

pub mod cache;
pub mod fx;
pub mod payload;
pub mod sources;
pub mod tidy;

pub use cache::{read_table, write_table, InMemoryLoader, RateCache, TableLoader};
pub use fx::{convert_base, Conversion, ConversionAdvisory};
pub use payload::RawRatePayload;
pub use sources::FetchRequest;
pub use tidy::{tidy, tidy_with_report, SkipCounts, TidyReport};
