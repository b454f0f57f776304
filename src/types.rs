//! Core table types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Calendar date of an observation
pub type RateDate = NaiveDate;

/// Currency code as carried in table rows (e.g. "EUR")
pub type Symbol = String;

/// Exchange rate: units of `symbol` per one unit of `base`
pub type Rate = f64;

/// One observation of a tidy rate table
///
/// `rate` is `None` only after a base conversion could not find the
/// pivot rate for the row's date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    pub date: RateDate,
    pub base: Symbol,
    pub symbol: Symbol,
    pub rate: Option<Rate>,
}

impl TidyRow {
    /// Create a row with a defined rate
    pub fn new(date: RateDate, base: impl Into<String>, symbol: impl Into<String>, rate: Rate) -> Self {
        Self {
            date,
            base: base.into(),
            symbol: symbol.into(),
            rate: Some(rate),
        }
    }
}

/// Flat `date, base, symbol, rate` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TidyTable {
    rows: Vec<TidyRow>,
}

impl TidyTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<TidyRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<TidyRow> {
        self.rows
    }

    pub fn push(&mut self, row: TidyRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TidyRow> {
        self.rows.iter()
    }

    /// Distinct base currencies, sorted
    pub fn bases(&self) -> Vec<Symbol> {
        distinct(self.rows.iter().map(|r| r.base.as_str()))
    }

    /// Distinct symbols, sorted
    pub fn symbols(&self) -> Vec<Symbol> {
        distinct(self.rows.iter().map(|r| r.symbol.as_str()))
    }

    /// The shared base currency, if every row has the same one
    pub fn single_base(&self) -> Option<&str> {
        let first = self.rows.first()?.base.as_str();
        self.rows
            .iter()
            .all(|r| r.base == first)
            .then_some(first)
    }

    /// Canonical order: symbol, then date (stable)
    pub fn sort_by_symbol_date(&mut self) {
        self.rows
            .sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.date.cmp(&b.date)));
    }

    /// Copy in canonical (symbol, date) order
    pub fn sorted_by_symbol_date(&self) -> Self {
        let mut sorted = self.clone();
        sorted.sort_by_symbol_date();
        sorted
    }

    /// Keep only rows whose symbol is in `symbols`
    pub fn filter_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| symbols.iter().any(|s| s.as_ref() == r.symbol))
            .cloned()
            .collect();
        Self { rows }
    }
}

impl FromIterator<TidyRow> for TidyTable {
    fn from_iter<I: IntoIterator<Item = TidyRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TidyTable {
    type Item = &'a TidyRow;
    type IntoIter = std::slice::Iter<'a, TidyRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Tidy row extended with derived per-symbol signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedRow {
    pub date: RateDate,
    pub base: Symbol,
    pub symbol: Symbol,
    pub rate: Option<Rate>,
    /// Day-over-day change in percent
    pub pct_change: Option<f64>,
    /// Trailing mean of `rate`
    pub ma7: Option<f64>,
    /// Trailing sample standard deviation of `rate`
    pub std7: Option<f64>,
    /// Rolling z-score of `pct_change`
    pub z_pct: Option<f64>,
    pub is_outlier: bool,
    /// Wilder relative strength index, 0..=100
    pub rsi14: Option<f64>,
}

impl AugmentedRow {
    /// Row with every derived column undefined
    pub fn from_tidy(row: &TidyRow) -> Self {
        Self {
            date: row.date,
            base: row.base.clone(),
            symbol: row.symbol.clone(),
            rate: row.rate,
            pct_change: None,
            ma7: None,
            std7: None,
            z_pct: None,
            is_outlier: false,
            rsi14: None,
        }
    }
}

/// Output of the metrics engine, ordered by (symbol, date)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AugmentedTable {
    rows: Vec<AugmentedRow>,
}

impl AugmentedTable {
    pub fn from_rows(rows: Vec<AugmentedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AugmentedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AugmentedRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AugmentedRow> {
        self.rows.iter()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        distinct(self.rows.iter().map(|r| r.symbol.as_str()))
    }

    pub fn bases(&self) -> Vec<Symbol> {
        distinct(self.rows.iter().map(|r| r.base.as_str()))
    }
}

impl<'a> IntoIterator for &'a AugmentedTable {
    type Item = &'a AugmentedRow;
    type IntoIter = std::slice::Iter<'a, AugmentedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<Symbol> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
