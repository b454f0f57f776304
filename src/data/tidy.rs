//! Tidy transformer: nested `date -> symbol -> rate` payload to flat rows

use super::payload::RawRatePayload;
use crate::types::{RateDate, TidyRow, TidyTable};
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde_json::Value;

/// Entries dropped while flattening a payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Dates whose value is not a `symbol -> rate` object
    pub malformed_dates: usize,
    /// Date keys that do not parse as calendar dates
    pub bad_dates: usize,
    /// Rates that are not positive finite numbers
    pub bad_rates: usize,
    /// Rates for a (date, symbol) already taken from another key of the same day
    pub duplicates: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.malformed_dates + self.bad_dates + self.bad_rates + self.duplicates
    }
}

/// Tidy table plus what was skipped to produce it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyReport {
    pub table: TidyTable,
    pub skipped: SkipCounts,
}

/// Flatten `payload` into rows quoted against `base`
///
/// Never fails: a missing, non-object or empty `rates` member yields an
/// empty table.
pub fn tidy(payload: &RawRatePayload, base: &str) -> TidyTable {
    tidy_with_report(payload, base).table
}

/// Like [`tidy`], also reporting skipped entries
pub fn tidy_with_report(payload: &RawRatePayload, base: &str) -> TidyReport {
    let dates = match payload.rates.as_object() {
        Some(map) if !map.is_empty() => map,
        _ => {
            log::debug!("Payload has no rates for base {}", base);
            return TidyReport::default();
        }
    };

    let mut skipped = SkipCounts::default();
    let mut rows: Vec<TidyRow> = Vec::new();
    // (date, symbol) -> (row index, came from an exact `YYYY-MM-DD` key)
    let mut seen: HashMap<(RateDate, String), (usize, bool)> = HashMap::new();

    for (date_str, symbols) in dates {
        let Some(symbols) = symbols.as_object() else {
            log::debug!("Skipping {}: rates entry is not an object", date_str);
            skipped.malformed_dates += 1;
            continue;
        };
        let Some((date, exact)) = parse_date(date_str) else {
            log::debug!("Skipping unparseable date {:?}", date_str);
            skipped.bad_dates += 1;
            continue;
        };
        for (symbol, value) in symbols {
            let Some(rate) = coerce_rate(value) else {
                log::debug!("Skipping {} {}: invalid rate {}", date_str, symbol, value);
                skipped.bad_rates += 1;
                continue;
            };
            let row = TidyRow::new(date, base, symbol.as_str(), rate);
            match seen.get_mut(&(date, symbol.clone())) {
                // A plain date key beats a timestamp key for the same day
                Some(slot) if exact && !slot.1 => {
                    log::debug!("Replacing {} {} with the rate under {:?}", date, symbol, date_str);
                    rows[slot.0] = row;
                    slot.1 = true;
                    skipped.duplicates += 1;
                }
                Some(_) => {
                    log::debug!("Dropping duplicate {} {} under {:?}", date, symbol, date_str);
                    skipped.duplicates += 1;
                }
                None => {
                    seen.insert((date, symbol.clone()), (rows.len(), exact));
                    rows.push(row);
                }
            }
        }
    }

    // Stable: symbol order within a date is the payload's
    rows.sort_by_key(|r| r.date);

    if skipped.total() > 0 {
        log::warn!(
            "Skipped {} payload entries ({} dates, {} date keys, {} rates, {} duplicates)",
            skipped.total(),
            skipped.malformed_dates,
            skipped.bad_dates,
            skipped.bad_rates,
            skipped.duplicates
        );
    }

    TidyReport {
        table: TidyTable::from_rows(rows),
        skipped,
    }
}

/// `YYYY-MM-DD`, optionally followed by a time part
///
/// The flag is `true` when the key is a bare date.
fn parse_date(s: &str) -> Option<(RateDate, bool)> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some((date, true));
    }
    s.get(..10)
        .and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok())
        .map(|date| (date, false))
}

fn coerce_rate(value: &Value) -> Option<f64> {
    let rate = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
