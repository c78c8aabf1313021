use crate::config::{RowPolicy, Settings};
use crate::error::LedgerError;
use crate::normalize::{format_date, parse_balance, parse_date};
use crate::source::Table;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, warn};

/// One row of the ledger sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    /// Position in the source table (0-based)
    pub index: usize,
    pub date: Option<NaiveDate>,
    pub counterparty: Option<String>,
    pub balance: Option<Decimal>,
    /// Non-empty balance text that is not a number (e.g. `정산중`)
    pub balance_raw: Option<String>,
    /// All cells in header order; the date cell is rewritten as `YYYY-MM-DD`
    pub cells: Vec<String>,
}

/// Full set of ledger rows fetched in one pass, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub headers: Vec<String>,
    pub rows: Vec<LedgerRow>,
    has_store_column: bool,
}

impl Snapshot {
    /// Normalize a raw table into ledger rows.
    ///
    /// Missing columns are tolerated: a table without the store column simply
    /// has no counterparties. Empty date or balance cells become `None`.
    ///
    /// Only dates are subject to `RowPolicy`. A balance that is not a number
    /// never rejects or drops its row; it is kept as `balance_raw`.
    pub fn from_table(table: Table, settings: &Settings) -> Result<Self, LedgerError> {
        let columns = &settings.columns;
        let date_idx = table.column(&columns.date);
        let store_idx = table.column(&columns.store);
        let balance_idx = table.column(&columns.balance);

        let mut rows = Vec::with_capacity(table.rows.len());

        for (index, mut cells) in table.rows.into_iter().enumerate() {
            let date = match parse_cell(&cells, date_idx, index, &columns.date, parse_date) {
                Ok(date) => date,
                Err(err) => {
                    skip_or_fail(err, settings.on_bad_row)?;
                    continue;
                }
            };
            let (balance, balance_raw) =
                match parse_cell(&cells, balance_idx, index, &columns.balance, parse_balance) {
                    Ok(balance) => (balance, None),
                    Err(LedgerError::Format { value, .. }) => {
                        debug!(row = index, value = %value, "Balance is not a number");
                        (None, Some(value))
                    }
                    Err(err) => return Err(err),
                };

            if let (Some(i), Some(date)) = (date_idx, date) {
                cells[i] = format_date(date);
            }

            let counterparty = store_idx
                .map(|i| cells[i].trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string);

            rows.push(LedgerRow {
                index,
                date,
                counterparty,
                balance,
                balance_raw,
                cells,
            });
        }

        Ok(Snapshot {
            headers: table.headers,
            rows,
            has_store_column: store_idx.is_some(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct store names in order of first appearance.
    pub fn counterparties(&self) -> Vec<&str> {
        if !self.has_store_column {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.counterparty.as_deref())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Rows for one store, in source order.
    pub fn history(&self, store: &str) -> Vec<&LedgerRow> {
        self.rows
            .iter()
            .filter(|row| row.counterparty.as_deref() == Some(store))
            .collect()
    }

    /// Last row for the store in source order.
    ///
    /// This is positional on purpose: the sheet is appended to, so the last
    /// row wins even when its date is older than an earlier row's.
    pub fn latest(&self, store: &str) -> Option<&LedgerRow> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.counterparty.as_deref() == Some(store))
    }
}

fn parse_cell<T>(
    cells: &[String],
    idx: Option<usize>,
    row: usize,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, LedgerError> {
    let Some(raw) = idx.map(|i| cells[i].as_str()) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse(raw).map(Some).ok_or_else(|| LedgerError::Format {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

fn skip_or_fail(err: LedgerError, policy: RowPolicy) -> Result<(), LedgerError> {
    match policy {
        RowPolicy::Fail => Err(err),
        RowPolicy::Skip => {
            warn!(error = %err, "Skipping ledger row");
            Ok(())
        }
    }
}
