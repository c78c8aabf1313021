use thiserror::Error;

/// Failures that abort a render.
///
/// An empty counterparty list or a store without rows is not an error: those
/// end up as notices on the page (see `view::Notice`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("data source unavailable: {0}")]
    DataSource(String),
    #[error("row {row}: cannot parse {column} value `{value}`")]
    Format {
        row: usize,
        column: String,
        value: String,
    },
}

impl LedgerError {
    pub fn data_source(err: impl std::fmt::Display) -> Self {
        LedgerError::DataSource(err.to_string())
    }

    /// True when the failure came from reaching the source, not its content.
    pub fn is_data_source(&self) -> bool {
        matches!(self, LedgerError::DataSource(_))
    }
}
