// Request handler: one interaction = fetch -> normalize -> render.

use crate::config::Settings;
use crate::error::LedgerError;
use crate::ledger::Snapshot;
use crate::source::LedgerSource;
use crate::view::{render, Page};
use tracing::{error, info, instrument};

/// Fetch the table and normalize it into a snapshot.
#[instrument(skip_all, fields(source = %source.describe()))]
pub fn load_snapshot(source: &dyn LedgerSource, settings: &Settings) -> Result<Snapshot, LedgerError> {
    let table = source.fetch()?;
    let snapshot = Snapshot::from_table(table, settings)?;
    info!(rows = snapshot.rows.len(), "Ledger snapshot loaded");
    Ok(snapshot)
}

/// Run the whole pipeline for one interaction.
///
/// Failures never produce a partial page: the result is either the full page
/// or `Page::failure`.
pub fn handle(source: &dyn LedgerSource, settings: &Settings, selection: Option<&str>) -> Page {
    match load_snapshot(source, settings) {
        Ok(snapshot) => render(&snapshot, selection, settings),
        Err(err) => {
            error!(error = %err, "Failed to render ledger page");
            Page::failure(&err)
        }
    }
}
