//! Metrics engine: derived per-symbol signals over a tidy table

use super::indicators::{pct_change, rolling_zscore, WilderRsi};
use super::rolling::RollingWindow;
use crate::config::MetricsConfig;
use crate::types::{AugmentedRow, AugmentedTable, TidyRow, TidyTable};

/// Derive metrics with the default windows
/// (7/3 moving stats, 14/5 z-score, 2.5 outlier threshold, RSI 14)
pub fn derive_metrics(table: &TidyTable) -> AugmentedTable {
    derive_metrics_with(table, &MetricsConfig::default())
}

/// Derive `pct_change`, `ma7`, `std7`, `z_pct`, `is_outlier` and `rsi14`
///
/// Rows are ordered by (symbol, date) and every series restarts at a symbol
/// boundary, so one symbol's rows never influence another's metrics.
pub fn derive_metrics_with(table: &TidyTable, config: &MetricsConfig) -> AugmentedTable {
    let sorted = table.sorted_by_symbol_date();
    let mut rows = Vec::with_capacity(sorted.len());

    for group in symbol_groups(sorted.rows()) {
        rows.extend(derive_group(group, config));
    }

    let outliers = rows.iter().filter(|r| r.is_outlier).count();
    log::debug!(
        "Derived metrics for {} rows, {} outliers",
        rows.len(),
        outliers
    );
    AugmentedTable::from_rows(rows)
}

/// Consecutive runs of rows sharing a symbol
fn symbol_groups(rows: &[TidyRow]) -> Vec<&[TidyRow]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=rows.len() {
        if i == rows.len() || rows[i].symbol != rows[start].symbol {
            if i > start {
                groups.push(&rows[start..i]);
            }
            start = i;
        }
    }
    groups
}

fn derive_group(group: &[TidyRow], config: &MetricsConfig) -> Vec<AugmentedRow> {
    let rates: Vec<Option<f64>> = group.iter().map(|r| r.rate).collect();

    let pct = pct_change(&rates);
    let moving = RollingWindow::compute(config.ma_window, config.ma_min_periods, &rates);
    let z = rolling_zscore(&pct, config.z_window, config.z_min_periods);
    let rsi = WilderRsi::compute(config.rsi_period, &rates);

    group
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut out = AugmentedRow::from_tidy(row);
            out.pct_change = pct[i];
            out.ma7 = moving[i].0;
            out.std7 = moving[i].1;
            out.z_pct = z[i];
            out.is_outlier = z[i].is_some_and(|z| z.abs() > config.outlier_threshold);
            out.rsi14 = rsi[i];
            out
        })
        .collect()
}
