// Cell normalization: sheet dates and balances arrive as free text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Output format for every date shown on screen.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// A space in a chrono format matches any run of whitespace, including none,
// so "%Y. %m. %d" also covers "2024.1.5".
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y. %m. %d",
    "%Y년 %m월 %d일",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y. %m. %d %H:%M:%S",
];

/// Parse a sheet date cell into a calendar date.
///
/// Returns `None` when no known layout matches. Callers decide whether that
/// is fatal (see `RowPolicy`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim().trim_end_matches('.').trim_end();
    if text.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }

    if let Some(datetime) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(datetime.date());
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a balance cell such as `1,500`, `₩1,500`, `1500원` or `-200.5`.
pub fn parse_balance(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₩')
        .trim_end_matches('원')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
