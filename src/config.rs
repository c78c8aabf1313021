// Configuration shared by the CLI and the web server.

use crate::source::{CachedSource, CsvFileSource};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATE_COLUMN: &str = "날짜";
pub const DEFAULT_STORE_COLUMN: &str = "거래처";
pub const DEFAULT_BALANCE_COLUMN: &str = "잔액";
pub const DEFAULT_CURRENCY: &str = "원";

/// What to do with a row whose date cannot be parsed.
///
/// Balances are never checked here; non-numeric text is shown as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RowPolicy {
    /// Reject the whole snapshot
    #[default]
    Fail,
    /// Drop the row and log a warning
    Skip,
}

/// Header names of the three columns the viewer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub date: String,
    pub store: String,
    pub balance: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE_COLUMN.to_string(),
            store: DEFAULT_STORE_COLUMN.to_string(),
            balance: DEFAULT_BALANCE_COLUMN.to_string(),
        }
    }
}

/// Everything the pipeline needs besides the source itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub columns: Columns,
    pub on_bad_row: RowPolicy,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: Columns::default(),
            on_bad_row: RowPolicy::Fail,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Command-line / environment configuration.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// CSV export of the ledger sheet
    #[arg(long, short, env = "PREPAID_SOURCE", default_value = "ledger.csv")]
    pub source: PathBuf,

    /// Header of the date column
    #[arg(long, env = "PREPAID_DATE_COLUMN", default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,

    /// Header of the store (counterparty) column
    #[arg(long, env = "PREPAID_STORE_COLUMN", default_value = DEFAULT_STORE_COLUMN)]
    pub store_column: String,

    /// Header of the balance column
    #[arg(long, env = "PREPAID_BALANCE_COLUMN", default_value = DEFAULT_BALANCE_COLUMN)]
    pub balance_column: String,

    /// Suffix printed after balances
    #[arg(long, env = "PREPAID_CURRENCY", default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    /// Policy for rows with an unparseable date
    #[arg(long, env = "PREPAID_ON_BAD_ROW", value_enum, default_value_t = RowPolicy::Fail)]
    pub on_bad_row: RowPolicy,

    /// Seconds a fetched table may be reused (0 = always re-read)
    #[arg(long, env = "PREPAID_CACHE_TTL", default_value_t = 0)]
    pub cache_ttl: u64,
}

impl Config {
    pub fn settings(&self) -> Settings {
        Settings {
            columns: Columns {
                date: self.date_column.clone(),
                store: self.store_column.clone(),
                balance: self.balance_column.clone(),
            },
            on_bad_row: self.on_bad_row,
            currency: self.currency.clone(),
        }
    }

    pub fn open_source(&self) -> CachedSource<CsvFileSource> {
        CachedSource::new(
            CsvFileSource::new(&self.source),
            Duration::from_secs(self.cache_ttl),
        )
    }
}
