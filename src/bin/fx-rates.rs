//! fx-rates CLI - fetch, cache and inspect exchange-rate signals
//!
//! ## Example Usage
//!
//! ```bash
//! # Fetch 90 days of USD rates into the cache (needs the `async` feature)
//! fx-rates fetch --days 90 --base USD --symbols EUR,GBP,JPY
//!
//! # Metrics re-based on EUR, exported as CSV
//! fx-rates show --base EUR --symbols USD,GBP --output rates.csv
//!
//! # Outlier listing and per-symbol summary
//! fx-rates outliers
//! fx-rates summary --symbols EUR,GBP,JPY,MXN
//! ```

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rusty_fxrates::config::{default_config_path, PipelineConfig};
use rusty_fxrates::data::cache::{RateCache, TableLoader};
use rusty_fxrates::pipeline::{
    correlation_matrix, outliers, summarize, PipelineOutput, RatePipeline, Selection,
};
use rusty_fxrates::types::AugmentedTable;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// fx-rates: exchange-rate pipeline with derived signals
#[derive(Parser)]
#[command(name = "fx-rates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exchange-rate ingestion, re-basing and signal analysis", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the cache directory
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a time series and cache it as today's snapshot
    #[cfg(feature = "async")]
    Fetch {
        /// Days of history (7-365)
        #[arg(short = 'n', long)]
        days: Option<u32>,

        /// Base currency requested from the source
        #[arg(short, long)]
        base: Option<String>,

        /// Comma-separated symbols
        #[arg(short, long)]
        symbols: Option<String>,
    },

    /// Show the derived metrics summary, optionally exporting the table
    Show {
        #[command(flatten)]
        view: ViewArgs,

        /// Export the augmented table (.csv or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List rows flagged as outliers
    Outliers {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Last / max / min rate per symbol
    Summary {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Correlation of daily changes between symbols
    Correlation {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show cache and configuration information
    Info,
}

#[derive(Args)]
struct ViewArgs {
    /// Re-express rates against this base
    #[arg(short, long)]
    base: Option<String>,

    /// Comma-separated symbols to analyse
    #[arg(short, long, value_delimiter = ',')]
    symbols: Vec<String>,
}

impl ViewArgs {
    fn selection(&self) -> Selection {
        Selection {
            base: self.base.clone(),
            symbols: self.symbols.clone(),
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let cache = RateCache::new(config.data_dir.clone());

    if cli.verbose {
        println!(
            "{} v{}",
            "fx-rates".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Data dir: {}",
            cache.dir().display().to_string().dimmed()
        );
    }

    match cli.command {
        #[cfg(feature = "async")]
        Commands::Fetch {
            days,
            base,
            symbols,
        } => fetch(&config, &cache, days, base, symbols),
        Commands::Show { view, output } => {
            let out = analyse(&config, &cache, &view)?;
            print_summary(&out);
            if let Some(path) = output {
                export(&out.table, &path)?;
                println!("{} {}", "Exported to".green(), path.display());
            }
            Ok(())
        }
        Commands::Outliers { view } => {
            let out = analyse(&config, &cache, &view)?;
            print_outliers(&out.table);
            Ok(())
        }
        Commands::Summary { view } => {
            let out = analyse(&config, &cache, &view)?;
            print_summary(&out);
            Ok(())
        }
        Commands::Correlation { view } => {
            let out = analyse(&config, &cache, &view)?;
            print_correlation(&out.table)
        }
        Commands::Info => show_info(&config, &cache, cli.config.as_deref()),
    }
}

#[cfg(feature = "async")]
fn fetch(
    config: &PipelineConfig,
    cache: &RateCache,
    days: Option<u32>,
    base: Option<String>,
    symbols: Option<String>,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rusty_fxrates::currency::CurrencyCode;
    use rusty_fxrates::data::sources::{ingest, FetchRequest, FrankfurterSource};
    use std::time::Duration;

    let base = match base {
        Some(b) => CurrencyCode::parse(&b)?,
        None => config.base_code()?,
    };
    let symbols = match symbols {
        Some(list) => CurrencyCode::parse_list(&list)?,
        None => config.symbol_codes()?,
    };
    let today = chrono::Local::now().date_naive();
    let request = FetchRequest::last_days(days.unwrap_or(config.history_days), today, base, symbols)?;
    let source = FrankfurterSource::with_base_url(&config.source_url)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!(
        "Fetching {} rates {}..{}",
        request.base, request.start, request.end
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(ingest(&source, cache, &request, today));
    spinner.finish_and_clear();
    let outcome = outcome?;

    println!(
        "{} {} rows -> {}",
        "Cached".green().bold(),
        outcome.report.table.len(),
        outcome.path.display()
    );
    let skipped = outcome.report.skipped;
    if skipped.total() > 0 {
        println!(
            "{} {} malformed dates, {} bad dates, {} bad rates, {} duplicates",
            "Skipped:".yellow(),
            skipped.malformed_dates,
            skipped.bad_dates,
            skipped.bad_rates,
            skipped.duplicates
        );
    }
    Ok(())
}

fn analyse(
    config: &PipelineConfig,
    cache: &RateCache,
    view: &ViewArgs,
) -> anyhow::Result<PipelineOutput> {
    let pipeline = RatePipeline::new(config.clone());
    let out = pipeline.run(cache, &view.selection())?;
    if let Some(advisory) = &out.advisory {
        println!("{} {}", "Warning:".yellow(), advisory);
    }
    if out.table.is_empty() {
        bail!("No rows to analyse in {}", cache.dir().display());
    }
    Ok(out)
}

fn print_summary(out: &PipelineOutput) {
    let base = out.table.bases().join(",");
    println!(
        "{} base {} | {} of {} symbols",
        "Summary:".cyan().bold(),
        base,
        out.selected_symbols.len(),
        out.available_symbols.len()
    );
    println!(
        "  {:<6} {:>14} {:>14} {:>14} {:>9} {:>6}",
        "symbol", "last", "max", "min", "outliers", "rows"
    );
    for s in summarize(&out.table) {
        println!(
            "  {:<6} {:>14} {:>14} {:>14} {:>9} {:>6}",
            s.symbol.bold(),
            fmt_value(s.last),
            fmt_value(s.max),
            fmt_value(s.min),
            s.outlier_count,
            s.observations
        );
    }
}

fn print_outliers(table: &AugmentedTable) {
    let rows = outliers(table);
    if rows.is_empty() {
        println!("{}", "No outliers".green());
        return;
    }
    println!("{} {}", "Outliers:".cyan().bold(), rows.len());
    println!(
        "  {:<6} {:<10} {:>14} {:>10} {:>8}",
        "symbol", "date", "rate", "pct", "z"
    );
    for row in rows {
        println!(
            "  {:<6} {:<10} {:>14} {:>10} {:>8}",
            row.symbol.bold(),
            row.date,
            fmt_value(row.rate),
            fmt_value(row.pct_change),
            fmt_value(row.z_pct).red()
        );
    }
}

fn print_correlation(table: &AugmentedTable) -> anyhow::Result<()> {
    let matrix = correlation_matrix(table)?;
    println!("{}", "Correlation of pct_change:".cyan().bold());
    print!("  {:<6}", "");
    for symbol in &matrix.symbols {
        print!(" {:>8}", symbol);
    }
    println!();
    for (symbol, row) in matrix.symbols.iter().zip(&matrix.values) {
        print!("  {:<6}", symbol.bold());
        for value in row {
            match value {
                Some(v) => print!(" {:>8.3}", v),
                None => print!(" {:>8}", "-"),
            }
        }
        println!();
    }
    Ok(())
}

fn export(table: &AugmentedTable, path: &Path) -> anyhow::Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => {
            let file = fs::File::create(path)?;
            serde_json::to_writer_pretty(file, table)?;
        }
        Some("csv") => {
            let mut wtr = csv::Writer::from_path(path)?;
            for row in table {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        _ => bail!("Unsupported export format: {} (use .csv or .json)", path.display()),
    }
    Ok(())
}

fn show_info(
    config: &PipelineConfig,
    cache: &RateCache,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    println!("{}", "fx-rates".cyan().bold());
    let config_path = config_path.map(Path::to_path_buf).or_else(default_config_path);
    if let Some(path) = config_path {
        let state = if path.exists() { "" } else { " (not found, defaults)" };
        println!("  {} {}{}", "Config:".bold(), path.display(), state.dimmed());
    }
    println!("  {} {}", "Data dir:".bold(), cache.dir().display());

    let snapshots = if cache.dir().exists() {
        cache.list_snapshots()?
    } else {
        Vec::new()
    };
    println!("  {} {}", "Snapshots:".bold(), snapshots.len());
    let latest = cache.latest_path()?;
    if latest.exists() {
        let rows = cache.load_latest()?.len();
        println!("  {} {} ({} rows)", "Latest:".bold(), latest.display(), rows);
    } else {
        println!("  {} {}", "Latest:".bold(), "none".dimmed());
    }

    println!("  {} {}", "Default base:".bold(), config.default_base);
    println!(
        "  {} {}",
        "Default symbols:".bold(),
        config.default_symbols.join(",")
    );
    println!("  {} {}", "History days:".bold(), config.history_days);
    println!("  {} {}", "Source:".bold(), config.source_url);
    Ok(())
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}
