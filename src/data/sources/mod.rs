//! External rate source integrations
//!
//! - Frankfurter: free ECB reference rates time series (feature `async`)

#[cfg(feature = "async")]
pub mod frankfurter;

#[cfg(feature = "async")]
pub use frankfurter::FrankfurterSource;

use crate::config::HISTORY_DAYS_RANGE;
use crate::currency::CurrencyCode;
use crate::error::{FxError, Result};
use chrono::{Duration, NaiveDate};

#[cfg(feature = "async")]
use super::cache::RateCache;
#[cfg(feature = "async")]
use super::payload::RawRatePayload;
#[cfg(feature = "async")]
use super::tidy::{tidy_with_report, TidyReport};
#[cfg(feature = "async")]
use std::path::PathBuf;

/// Date range, base and symbols of a time-series request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub base: CurrencyCode,
    /// Empty means every symbol the source publishes
    pub symbols: Vec<CurrencyCode>,
}

impl FetchRequest {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        base: CurrencyCode,
        symbols: Vec<CurrencyCode>,
    ) -> Result<Self> {
        if start > end {
            return Err(FxError::DataError(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self {
            start,
            end,
            base,
            symbols,
        })
    }

    /// The `days` days of history ending on `today`
    pub fn last_days(
        days: u32,
        today: NaiveDate,
        base: CurrencyCode,
        symbols: Vec<CurrencyCode>,
    ) -> Result<Self> {
        if !HISTORY_DAYS_RANGE.contains(&days) {
            return Err(FxError::ConfigError(format!(
                "days must be within {}..={}, got {}",
                HISTORY_DAYS_RANGE.start(),
                HISTORY_DAYS_RANGE.end(),
                days
            )));
        }
        Self::new(today - Duration::days(i64::from(days)), today, base, symbols)
    }
}

/// Trait for external rate sources
#[cfg(feature = "async")]
pub trait RateSource: Send + Sync {
    /// Fetch the time series described by `request`
    fn fetch_timeseries(
        &self,
        request: &FetchRequest,
    ) -> impl std::future::Future<Output = Result<RawRatePayload>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Where an ingest landed and what the transformer skipped
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub path: PathBuf,
    pub report: TidyReport,
}

/// Fetch, tidy and cache one snapshot dated `today`
///
/// A payload that tidies to zero rows is an error and leaves the cache untouched.
#[cfg(feature = "async")]
pub async fn ingest<S: RateSource>(
    source: &S,
    cache: &RateCache,
    request: &FetchRequest,
    today: NaiveDate,
) -> Result<IngestOutcome> {
    let payload = source.fetch_timeseries(request).await?;
    let report = tidy_with_report(&payload, request.base.as_str());
    if report.table.is_empty() {
        return Err(FxError::NoData(format!(
            "{} returned no rates for {} between {} and {}",
            source.name(),
            request.base,
            request.start,
            request.end
        )));
    }
    let path = cache.write_snapshot(&report.table, today)?;
    log::info!(
        "Cached {} rows from {} in {}",
        report.table.len(),
        source.name(),
        path.display()
    );
    Ok(IngestOutcome { path, report })
}
