//! Views over an augmented table for charts, listings and summaries

use crate::error::{FxError, Result};
use crate::types::{AugmentedRow, AugmentedTable, RateDate, Symbol};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric column of an augmented row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Rate,
    PctChange,
    Ma7,
    Std7,
    ZPct,
    Rsi14,
}

impl Field {
    pub fn value(&self, row: &AugmentedRow) -> Option<f64> {
        match self {
            Field::Rate => row.rate,
            Field::PctChange => row.pct_change,
            Field::Ma7 => row.ma7,
            Field::Std7 => row.std7,
            Field::ZPct => row.z_pct,
            Field::Rsi14 => row.rsi14,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Rate => "rate",
            Field::PctChange => "pct_change",
            Field::Ma7 => "ma7",
            Field::Std7 => "std7",
            Field::ZPct => "z_pct",
            Field::Rsi14 => "rsi14",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rate" => Ok(Field::Rate),
            "pct_change" | "pct" => Ok(Field::PctChange),
            "ma7" => Ok(Field::Ma7),
            "std7" => Ok(Field::Std7),
            "z_pct" | "z" => Ok(Field::ZPct),
            "rsi14" | "rsi" => Ok(Field::Rsi14),
            _ => Err(FxError::ParseError(format!("Unknown field: {}", s))),
        }
    }
}

/// Date x symbol grid of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePivot {
    pub field: &'static str,
    pub symbols: Vec<Symbol>,
    pub cells: BTreeMap<RateDate, BTreeMap<Symbol, Option<f64>>>,
}

impl DatePivot {
    pub fn get(&self, date: RateDate, symbol: &str) -> Option<f64> {
        self.cells.get(&date)?.get(symbol).copied().flatten()
    }

    /// One symbol's values in date order; dates it lacks are `None`
    pub fn column(&self, symbol: &str) -> Vec<(RateDate, Option<f64>)> {
        self.cells
            .iter()
            .map(|(date, row)| (*date, row.get(symbol).copied().flatten()))
            .collect()
    }

    pub fn dates(&self) -> impl Iterator<Item = &RateDate> {
        self.cells.keys()
    }
}

/// Pivot `field` by date and symbol; a repeated (date, symbol) keeps the last row
pub fn pivot(table: &AugmentedTable, field: Field) -> DatePivot {
    let mut cells: BTreeMap<RateDate, BTreeMap<Symbol, Option<f64>>> = BTreeMap::new();
    for row in table {
        cells
            .entry(row.date)
            .or_default()
            .insert(row.symbol.clone(), field.value(row));
    }
    DatePivot {
        field: field.name(),
        symbols: table.symbols(),
        cells,
    }
}

/// Rows flagged as outliers, ordered by (symbol, date)
pub fn outliers(table: &AugmentedTable) -> Vec<AugmentedRow> {
    let mut rows: Vec<AugmentedRow> = table.iter().filter(|r| r.is_outlier).cloned().collect();
    rows.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.date.cmp(&b.date)));
    rows
}

/// Per-symbol aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolSummary {
    pub symbol: Symbol,
    /// Latest defined rate
    pub last: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub outlier_count: usize,
    pub observations: usize,
}

/// Last / max / min rate and outlier count per symbol, ordered by symbol
pub fn summarize(table: &AugmentedTable) -> Vec<SymbolSummary> {
    let mut groups: BTreeMap<&str, Vec<&AugmentedRow>> = BTreeMap::new();
    for row in table {
        groups.entry(row.symbol.as_str()).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(symbol, mut rows)| {
            rows.sort_by_key(|r| r.date);
            let rates: Vec<f64> = rows.iter().filter_map(|r| r.rate).collect();
            SymbolSummary {
                symbol: symbol.to_string(),
                last: rates.last().copied(),
                max: rates.iter().copied().reduce(f64::max),
                min: rates.iter().copied().reduce(f64::min),
                outlier_count: rows.iter().filter(|r| r.is_outlier).count(),
                observations: rows.len(),
            }
        })
        .collect()
}

/// Symmetric matrix of pairwise correlations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<Symbol>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation of `pct_change` between every pair of symbols
///
/// Uses the dates on which both symbols have a defined change. Pairs with
/// fewer than two shared observations or without variance are `None`.
/// A mixed-base table is rejected.
pub fn correlation_matrix(table: &AugmentedTable) -> Result<CorrelationMatrix> {
    let bases = table.bases();
    if bases.len() > 1 {
        return Err(FxError::MixedBases { bases });
    }

    let grid = pivot(table, Field::PctChange);
    let columns: Vec<Vec<(RateDate, Option<f64>)>> =
        grid.symbols.iter().map(|s| grid.column(s)).collect();

    let n = grid.symbols.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let (x, y): (Vec<f64>, Vec<f64>) = columns[i]
                .iter()
                .zip(&columns[j])
                .filter_map(|((_, a), (_, b))| Some(((*a)?, (*b)?)))
                .unzip();
            let r = pearson(&x, &y).map(|r| if i == j { 1.0 } else { r });
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        symbols: grid.symbols,
        values,
    })
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    let x_mean = x.iter().mean();
    let y_mean = y.iter().mean();
    let covariance: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>()
        / (x.len() - 1) as f64;
    let x_std = x.iter().std_dev();
    let y_std = y.iter().std_dev();
    if x_std > 0.0 && y_std > 0.0 {
        let r = covariance / (x_std * y_std);
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    } else {
        None
    }
}
