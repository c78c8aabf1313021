// Prepaid Ledger Viewer - Core Library
// Exposes the pipeline for the CLI/TUI, the web server, and tests

pub mod config;
pub mod error;
pub mod format;
pub mod ledger;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod view;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use config::{Columns, Config, RowPolicy, Settings};
pub use error::LedgerError;
pub use format::format_balance;
pub use ledger::{LedgerRow, Snapshot};
pub use pipeline::{handle, load_snapshot};
pub use source::{CachedSource, CsvFileSource, CsvTextSource, LedgerSource, Table};
pub use view::{render, Body, Detail, HistoryTable, Metric, Notice, Page, Selector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the stderr log subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
