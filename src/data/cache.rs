//! CSV rate cache
//!
//! One file per fetch (`rates_YYYY-MM-DD.csv`) with columns
//! `date,base,symbol,rate`. Readers take the most recently modified file.

use crate::error::{FxError, Result};
use crate::types::{TidyRow, TidyTable};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Cache file columns, in write order
pub const CSV_HEADERS: [&str; 4] = ["date", "base", "symbol", "rate"];

/// Name used when no snapshot exists yet
pub const FALLBACK_FILE: &str = "rates_cache.csv";

/// Capability to load the most recent tidy table
///
/// The pipeline receives this instead of walking the filesystem itself.
pub trait TableLoader: Send + Sync {
    fn load_latest(&self) -> Result<TidyTable>;
}

/// Read a cache table from any reader
pub fn read_table_from<R: io::Read>(reader: R) -> Result<TidyTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = CSV_HEADERS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(FxError::DataError(format!(
            "Cache is missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut table = TidyTable::new();
    for result in rdr.deserialize() {
        let row: TidyRow = result?;
        table.push(row);
    }
    Ok(table)
}

/// Read a cache file
pub fn read_table(path: &Path) -> Result<TidyTable> {
    let file = fs::File::open(path)?;
    let table = read_table_from(file)?;
    log::info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Write a table to any writer; the header row is written even when empty
pub fn write_table_to<W: io::Write>(writer: W, table: &TidyTable) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;
    for row in table {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table to `path`, replacing any existing file
pub fn write_table(path: &Path, table: &TidyTable) -> Result<()> {
    let file = fs::File::create(path)?;
    write_table_to(file, table)?;
    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Directory of CSV snapshots
#[derive(Debug, Clone)]
pub struct RateCache {
    dir: PathBuf,
}

impl RateCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Snapshot file for a fetch made on `day`
    pub fn snapshot_path(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("rates_{}.csv", day.format("%Y-%m-%d")))
    }

    pub fn fallback_path(&self) -> PathBuf {
        self.dir.join(FALLBACK_FILE)
    }

    /// Persist `table` as the snapshot for `day`
    pub fn write_snapshot(&self, table: &TidyTable, day: NaiveDate) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.snapshot_path(day);
        write_table(&path, table)?;
        Ok(path)
    }

    /// All `*.csv` files, oldest modification first
    pub fn list_snapshots(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if !is_csv || !path.is_file() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            files.push((modified, path));
        }
        files.sort();
        Ok(files.into_iter().map(|(_, p)| p).collect())
    }

    /// Most recently modified snapshot, or the fallback path if none exist
    pub fn latest_path(&self) -> Result<PathBuf> {
        Ok(self
            .list_snapshots()?
            .pop()
            .unwrap_or_else(|| self.fallback_path()))
    }
}

impl TableLoader for RateCache {
    fn load_latest(&self) -> Result<TidyTable> {
        let path = self.latest_path()?;
        if !path.exists() {
            return Err(FxError::CacheNotFound(path));
        }
        read_table(&path)
    }
}

/// Loader over a table already in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    table: TidyTable,
}

impl InMemoryLoader {
    pub fn new(table: TidyTable) -> Self {
        Self { table }
    }
}

impl TableLoader for InMemoryLoader {
    fn load_latest(&self) -> Result<TidyTable> {
        Ok(self.table.clone())
    }
}
