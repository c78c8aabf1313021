// Snapshot loader - Data sources
// Every source answers one question: "give me all rows as a table".

use crate::error::LedgerError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Raw table as exported by the sheet: header row plus text cells.
///
/// Every row has exactly `headers.len()` cells; short rows are padded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Read a CSV stream with a header row.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, LedgerError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(LedgerError::data_source)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(LedgerError::data_source)?;
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            cells.resize(headers.len(), String::new());
            rows.push(cells);
        }

        Ok(Table { headers, rows })
    }
}

/// LedgerSource - the only capability the viewer needs from the sheet.
///
/// Implementations must always return the full table; there is no filtering
/// or paging.
pub trait LedgerSource: Send + Sync {
    fn fetch(&self) -> Result<Table, LedgerError>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

// ============================================================================
// CSV FILE
// ============================================================================

/// CSV export of the ledger sheet on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerSource for CsvFileSource {
    fn fetch(&self) -> Result<Table, LedgerError> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            LedgerError::DataSource(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        let table = Table::from_csv(file)?;
        info!(source = %self.path.display(), rows = table.rows.len(), "Fetched ledger table");
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

// ============================================================================
// IN-MEMORY CSV
// ============================================================================

/// CSV text held in memory (stdin dumps, tests).
#[derive(Debug, Clone)]
pub struct CsvTextSource {
    text: String,
}

impl CsvTextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl LedgerSource for CsvTextSource {
    fn fetch(&self) -> Result<Table, LedgerError> {
        Table::from_csv(self.text.as_bytes())
    }

    fn describe(&self) -> String {
        "csv:<memory>".to_string()
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Wraps a source with a time-to-live. A zero TTL disables caching, so every
/// fetch reaches the inner source.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    cached: Mutex<Option<(Instant, Table)>>,
}

impl<S: LedgerSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: LedgerSource> LedgerSource for CachedSource<S> {
    fn fetch(&self) -> Result<Table, LedgerError> {
        if self.ttl.is_zero() {
            return self.inner.fetch();
        }

        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((fetched_at, table)) = cached.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                debug!(source = %self.inner.describe(), "Serving cached ledger table");
                return Ok(table.clone());
            }
        }

        // Failures are not cached; the next call retries the source.
        let table = self.inner.fetch()?;
        *cached = Some((Instant::now(), table.clone()));
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("{} (ttl {}s)", self.inner.describe(), self.ttl.as_secs())
    }
}
