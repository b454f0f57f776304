//! Metrics pipeline: load, rebase, select and derive
//!
//! The core steps live in submodules and are usable on their own;
//! [`RatePipeline`] strings them together the way the dashboard and the CLI
//! consume them.

pub mod indicators;
pub mod metrics;
pub mod presentation;
pub mod rolling;

pub use indicators::{pct_change, rolling_zscore, WilderRsi};
pub use metrics::{derive_metrics, derive_metrics_with};
pub use presentation::{
    correlation_matrix, outliers, pivot, summarize, CorrelationMatrix, DatePivot, Field,
    SymbolSummary,
};
pub use rolling::RollingWindow;

use crate::config::PipelineConfig;
use crate::currency::normalize;
use crate::data::cache::TableLoader;
use crate::data::fx::{convert_base, ConversionAdvisory};
use crate::error::Result;
use crate::types::{AugmentedTable, Symbol};

/// What the caller wants to look at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Target base; `None` keeps the cached base
    pub base: Option<String>,
    /// Symbols to keep; empty selects the first `default_view_count` available
    pub symbols: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_symbols<S: AsRef<str>>(mut self, symbols: &[S]) -> Self {
        self.symbols = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }
}

/// Pipeline output
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: AugmentedTable,
    /// Every symbol present after conversion, sorted
    pub available_symbols: Vec<Symbol>,
    /// Symbols actually derived, sorted
    pub selected_symbols: Vec<Symbol>,
    pub advisory: Option<ConversionAdvisory>,
}

/// Load -> convert -> select -> derive
#[derive(Debug, Clone, Default)]
pub struct RatePipeline {
    config: PipelineConfig,
}

impl RatePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline against the latest table from `loader`
    pub fn run(&self, loader: &dyn TableLoader, selection: &Selection) -> Result<PipelineOutput> {
        let table = loader.load_latest()?;

        let (table, advisory) = match &selection.base {
            Some(base) => {
                let conversion = convert_base(&table, base);
                if let Some(advisory) = &conversion.advisory {
                    log::warn!("{}", advisory);
                }
                (conversion.table, conversion.advisory)
            }
            None => (table, None),
        };

        let available_symbols = table.symbols();
        let selected_symbols = self.select(&available_symbols, &selection.symbols);
        log::debug!(
            "Selected {:?} of {} available symbols",
            selected_symbols,
            available_symbols.len()
        );

        let selected = table.filter_symbols(&selected_symbols);
        let derived = metrics::derive_metrics_with(&selected, &self.config.metrics);

        Ok(PipelineOutput {
            table: derived,
            available_symbols,
            selected_symbols,
            advisory,
        })
    }

    fn select(&self, available: &[Symbol], requested: &[String]) -> Vec<Symbol> {
        if requested.is_empty() {
            return available
                .iter()
                .take(self.config.default_view_count)
                .cloned()
                .collect();
        }

        // Match case-insensitively but keep the table's own spelling
        let mut selected: Vec<Symbol> = Vec::new();
        for symbol in requested.iter().map(|s| normalize(s)) {
            match available.iter().find(|a| normalize(a) == symbol) {
                Some(found) if !selected.contains(found) => selected.push(found.clone()),
                Some(_) => {}
                None => log::warn!("Ignoring unknown symbol {}", symbol),
            }
        }
        selected.sort();
        selected
    }
}
