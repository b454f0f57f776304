//! Base converter: re-express a tidy table against another base currency

use crate::currency::{cross_rate, invert_rate, normalize};
use crate::types::{RateDate, TidyRow, TidyTable};
use hashbrown::HashMap;
use std::fmt;

/// Non-fatal notice returned alongside a conversion result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionAdvisory {
    /// The target appears neither as a symbol nor as the current base
    TargetNotFound { target: String, base: String },
    /// Rows are quoted against more than one base; nothing was converted
    MixedBases { bases: Vec<String> },
}

impl fmt::Display for ConversionAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionAdvisory::TargetNotFound { target, base } => write!(
                f,
                "cannot convert to {}: no {} rates in a {} table, keeping {}",
                target, target, base, base
            ),
            ConversionAdvisory::MixedBases { bases } => {
                write!(f, "cannot convert a table with mixed bases: {}", bases.join(", "))
            }
        }
    }
}

/// Result of [`convert_base`]
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub table: TidyTable,
    pub advisory: Option<ConversionAdvisory>,
}

impl Conversion {
    fn unchanged(table: TidyTable, advisory: Option<ConversionAdvisory>) -> Self {
        Self { table, advisory }
    }
}

/// Re-express every rate in `table` against `new_base`
///
/// For each date the pivot `r = old_base/new_base` divides every other
/// rate (`old/sym / old/new = new/sym`). The `new_base` row turns into the
/// `old_base` row with rate `1/r`; no `new_base -> new_base` self-rate row
/// is produced. Dates without a usable pivot keep their rows with an
/// undefined rate and get no `old_base` row. Rows already quoting
/// `old_base` against itself are dropped, since the pivot row replaces them.
///
/// The output is sorted by (symbol, date). When conversion is impossible
/// the input comes back unchanged together with an advisory.
pub fn convert_base(table: &TidyTable, new_base: &str) -> Conversion {
    let target = normalize(new_base);

    if table.is_empty() {
        return Conversion::unchanged(table.clone(), None);
    }

    let old_base = match table.single_base() {
        Some(base) => base.to_string(),
        None => {
            let bases = table.bases();
            log::warn!("Refusing base conversion of mixed-base table: {:?}", bases);
            return Conversion::unchanged(
                table.sorted_by_symbol_date(),
                Some(ConversionAdvisory::MixedBases { bases }),
            );
        }
    };

    if normalize(&old_base) == target {
        return Conversion::unchanged(table.sorted_by_symbol_date(), None);
    }

    if !table.iter().any(|r| normalize(&r.symbol) == target) {
        let advisory = ConversionAdvisory::TargetNotFound {
            target: target.clone(),
            base: old_base.clone(),
        };
        log::warn!("{}", advisory);
        return Conversion::unchanged(table.clone(), Some(advisory));
    }

    let pivot: HashMap<RateDate, Option<f64>> = table
        .iter()
        .filter(|r| normalize(&r.symbol) == target)
        .map(|r| (r.date, r.rate.filter(|x| x.is_finite() && *x > 0.0)))
        .collect();

    let old_norm = normalize(&old_base);
    let mut misses = 0usize;
    let mut rows = Vec::with_capacity(table.len());

    for row in table {
        let symbol = normalize(&row.symbol);
        if symbol == old_norm {
            continue;
        }
        let r = pivot.get(&row.date).copied().flatten();
        if symbol == target {
            rows.push(TidyRow {
                date: row.date,
                base: target.clone(),
                symbol: old_base.clone(),
                rate: r.and_then(invert_rate),
            });
            continue;
        }
        let rate = match (row.rate, r) {
            (Some(x), Some(r)) => cross_rate(x, r),
            _ => None,
        };
        if rate.is_none() {
            misses += 1;
        }
        rows.push(TidyRow {
            date: row.date,
            base: target.clone(),
            symbol: row.symbol.clone(),
            rate,
        });
    }

    if misses > 0 {
        log::warn!(
            "{} rows left without a rate converting {} -> {}",
            misses,
            old_base,
            target
        );
    }
    log::debug!("Converted {} rows from {} to {}", rows.len(), old_base, target);

    let mut converted = TidyTable::from_rows(rows);
    converted.sort_by_symbol_date();
    Conversion {
        table: converted,
        advisory: None,
    }
}
