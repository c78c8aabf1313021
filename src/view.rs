// Page model - what every front end (text, TUI, web) draws.
// `render` is a pure function of the snapshot and the selection.

use crate::config::Settings;
use crate::error::LedgerError;
use crate::format::format_balance;
use crate::ledger::Snapshot;
use crate::normalize::format_date;
use serde::Serialize;
use std::fmt;

// ============================================================================
// LABELS
// ============================================================================

pub const PAGE_TITLE: &str = "선결제 장부 확인";
pub const PAGE_ICON: &str = "💳";
pub const HEADING: &str = "💳 선결제 잔액 조회";
pub const SELECTOR_HEADING: &str = "📋 선결제 내역 선택";
pub const SELECTOR_LABEL: &str = "확인할 거래처를 선택하세요:";
pub const LAST_UPDATED_LABEL: &str = "최근 갱신 날짜";
pub const BALANCE_LABEL: &str = "현재 잔액";
pub const HISTORY_TITLE: &str = "지난 내역 보기";
pub const NO_HISTORY: &str = "내역이 없습니다.";
pub const NO_DATA: &str = "데이터가 없거나 거래처를 불러올 수 없습니다.";
pub const STORE_ICON: &str = "🏪";

/// Shown for an empty date or balance cell.
pub const MISSING_VALUE: &str = "-";

// ============================================================================
// PAGE MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub icon: String,
    pub heading: String,
    /// Absent when the snapshot could not be loaded
    pub selector: Option<Selector>,
    pub body: Body,
}

/// Single-choice store list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selector {
    pub heading: String,
    pub label: String,
    pub options: Vec<String>,
    /// Index of `value` in `options`, if it is listed
    pub selected: Option<usize>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    Detail(Detail),
    Notice(Notice),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    pub store: String,
    pub heading: String,
    pub last_updated: Metric,
    pub balance: Metric,
    pub history: HistoryTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// Collapsible table of a store's rows, newest-loaded first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryTable {
    pub title: String,
    /// First column is the row index in the source table
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Notice {
    /// No stores at all (informational)
    NoData { message: String },
    /// The selected store has no rows (warning)
    NoHistory { store: String, message: String },
}

impl Page {
    fn frame(selector: Option<Selector>, body: Body) -> Self {
        Page {
            title: PAGE_TITLE.to_string(),
            icon: PAGE_ICON.to_string(),
            heading: HEADING.to_string(),
            selector,
            body,
        }
    }

    /// Page shown in place of everything else when the pipeline fails.
    pub fn failure(err: &LedgerError) -> Self {
        Page::frame(
            None,
            Body::Error {
                message: err.to_string(),
            },
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.body, Body::Error { .. })
    }

    pub fn selected_store(&self) -> Option<&str> {
        self.selector.as_ref().and_then(|s| s.value.as_deref())
    }

    pub fn detail(&self) -> Option<&Detail> {
        match &self.body {
            Body::Detail(detail) => Some(detail),
            _ => None,
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Resolve the store to show.
///
/// An explicit request wins even when the store is not listed (it then has
/// no history); otherwise the first store is chosen. Nothing is selected
/// when there are no stores.
pub fn select<'a>(stores: &[&'a str], requested: Option<&'a str>) -> Option<&'a str> {
    if stores.is_empty() {
        return None;
    }
    requested.or_else(|| stores.first().copied())
}

/// Build the page for one interaction.
pub fn render(snapshot: &Snapshot, requested: Option<&str>, settings: &Settings) -> Page {
    let stores = snapshot.counterparties();
    let value = select(&stores, requested);

    let selector = Selector {
        heading: SELECTOR_HEADING.to_string(),
        label: SELECTOR_LABEL.to_string(),
        options: stores.iter().map(|s| s.to_string()).collect(),
        selected: value.and_then(|v| stores.iter().position(|s| *s == v)),
        value: value.map(str::to_string),
    };

    let body = match value {
        None => Body::Notice(Notice::NoData {
            message: NO_DATA.to_string(),
        }),
        Some(store) => render_store(snapshot, store, settings),
    };

    Page::frame(Some(selector), body)
}

fn render_store(snapshot: &Snapshot, store: &str, settings: &Settings) -> Body {
    let Some(latest) = snapshot.latest(store) else {
        return Body::Notice(Notice::NoHistory {
            store: store.to_string(),
            message: NO_HISTORY.to_string(),
        });
    };

    let last_updated = latest
        .date
        .map(format_date)
        .unwrap_or_else(|| MISSING_VALUE.to_string());
    // Only the latest row's balance is ever formatted; non-numeric text is
    // shown as written.
    let balance = match (&latest.balance, &latest.balance_raw) {
        (Some(amount), _) => format_balance(*amount, &settings.currency),
        (None, Some(raw)) => raw.clone(),
        (None, None) => MISSING_VALUE.to_string(),
    };

    let mut columns = vec![String::new()];
    columns.extend(snapshot.headers.iter().cloned());

    let rows = snapshot
        .history(store)
        .into_iter()
        .rev()
        .map(|row| {
            let mut cells = vec![row.index.to_string()];
            cells.extend(row.cells.iter().cloned());
            cells
        })
        .collect();

    Body::Detail(Detail {
        store: store.to_string(),
        heading: format!("{} {}", STORE_ICON, store),
        last_updated: Metric {
            label: LAST_UPDATED_LABEL.to_string(),
            value: last_updated,
        },
        balance: Metric {
            label: BALANCE_LABEL.to_string(),
            value: balance,
        },
        history: HistoryTable {
            title: HISTORY_TITLE.to_string(),
            columns,
            rows,
        },
    })
}

// ============================================================================
// TEXT OUTPUT
// ============================================================================

const RULE: &str = "────────────────────────────────────────";

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "{}", RULE)?;

        if let Some(selector) = &self.selector {
            writeln!(f, "{}", selector.heading)?;
            writeln!(f, "{}", selector.label)?;
            for (i, option) in selector.options.iter().enumerate() {
                let mark = if selector.selected == Some(i) { "(•)" } else { "( )" };
                writeln!(f, "  {} {}", mark, option)?;
            }
            writeln!(f, "{}", RULE)?;
        }

        match &self.body {
            Body::Detail(detail) => {
                writeln!(f, "{}", detail.heading)?;
                writeln!(f, "{}: {}", detail.last_updated.label, detail.last_updated.value)?;
                writeln!(f, "{}: {}", detail.balance.label, detail.balance.value)?;
                writeln!(f)?;
                writeln!(f, "▼ {}", detail.history.title)?;
                write_table(f, &detail.history.columns, &detail.history.rows)
            }
            Body::Notice(Notice::NoData { message }) => writeln!(f, "ℹ {}", message),
            Body::Notice(Notice::NoHistory { message, .. }) => writeln!(f, "⚠ {}", message),
            Body::Error { message } => writeln!(f, "✖ {}", message),
        }
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, columns: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    writeln!(f, "{}", line(columns))?;
    for row in rows {
        writeln!(f, "{}", line(row.as_slice()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Table;

    fn snapshot(csv: &str) -> Snapshot {
        Snapshot::from_table(Table::from_csv(csv.as_bytes()).unwrap(), &Settings::default()).unwrap()
    }

    const LEDGER: &str = "날짜,거래처,잔액\n2024-01-01,Shop A,1000\n2024-01-05,Shop B,2000\n2024-01-10,Shop A,1500\n";

    #[test]
    fn test_select_defaults_to_first() {
        assert_eq!(select(&["Shop A", "Shop B"], None), Some("Shop A"));
        assert_eq!(select(&["Shop A", "Shop B"], Some("Shop B")), Some("Shop B"));
        assert_eq!(select(&["Shop A"], Some("Shop C")), Some("Shop C"));
        assert_eq!(select(&[], Some("Shop A")), None);
        assert_eq!(select(&[], None), None);
    }

    #[test]
    fn test_render_default_selection() {
        let page = render(&snapshot(LEDGER), None, &Settings::default());
        let selector = page.selector.as_ref().unwrap();

        assert_eq!(selector.options, vec!["Shop A", "Shop B"]);
        assert_eq!(selector.selected, Some(0));
        assert_eq!(page.selected_store(), Some("Shop A"));
        assert_eq!(page.detail().unwrap().heading, "🏪 Shop A");
    }

    #[test]
    fn test_render_detail_metrics_and_history() {
        let page = render(&snapshot(LEDGER), Some("Shop A"), &Settings::default());
        let detail = page.detail().unwrap();

        assert_eq!(detail.last_updated.label, LAST_UPDATED_LABEL);
        assert_eq!(detail.last_updated.value, "2024-01-10");
        assert_eq!(detail.balance.label, BALANCE_LABEL);
        assert_eq!(detail.balance.value, "1,500 원");
        assert_eq!(detail.history.columns, vec!["", "날짜", "거래처", "잔액"]);
        assert_eq!(
            detail.history.rows,
            vec![
                vec!["2", "2024-01-10", "Shop A", "1500"],
                vec!["0", "2024-01-01", "Shop A", "1000"],
            ]
        );
    }

    #[test]
    fn test_render_missing_values() {
        let page = render(&snapshot("날짜,거래처,잔액\n,Shop A,\n"), None, &Settings::default());
        let detail = page.detail().unwrap();

        assert_eq!(detail.last_updated.value, MISSING_VALUE);
        assert_eq!(detail.balance.value, MISSING_VALUE);
    }

    #[test]
    fn test_render_other_store_bad_balance() {
        let snap = snapshot("날짜,거래처,잔액\n2024-01-01,Shop A,1000\n2024-01-02,Shop B,정산중\n");

        let page = render(&snap, Some("Shop A"), &Settings::default());
        assert_eq!(page.detail().unwrap().balance.value, "1,000 원");

        let page = render(&snap, Some("Shop B"), &Settings::default());
        assert_eq!(page.detail().unwrap().balance.value, "정산중");
        assert_eq!(page.detail().unwrap().last_updated.value, "2024-01-02");
    }

    #[test]
    fn test_render_no_data() {
        let page = render(&snapshot("날짜,거래처,잔액\n"), None, &Settings::default());

        assert!(page.selector.as_ref().unwrap().options.is_empty());
        assert_eq!(page.selected_store(), None);
        assert_eq!(
            page.body,
            Body::Notice(Notice::NoData {
                message: NO_DATA.to_string()
            })
        );
    }

    #[test]
    fn test_render_no_history() {
        let page = render(&snapshot(LEDGER), Some("Shop C"), &Settings::default());

        assert_eq!(page.selector.as_ref().unwrap().selected, None);
        assert_eq!(
            page.body,
            Body::Notice(Notice::NoHistory {
                store: "Shop C".to_string(),
                message: NO_HISTORY.to_string()
            })
        );
    }

    #[test]
    fn test_failure_page_has_no_sections() {
        let page = Page::failure(&LedgerError::DataSource("offline".to_string()));

        assert!(page.is_failure());
        assert!(page.selector.is_none());
        assert_eq!(page.heading, HEADING);
    }

    #[test]
    fn test_display_detail() {
        let text = render(&snapshot(LEDGER), Some("Shop A"), &Settings::default()).to_string();

        assert!(text.contains("(•) Shop A"));
        assert!(text.contains("( ) Shop B"));
        assert!(text.contains("현재 잔액: 1,500 원"));
        assert!(text.contains("최근 갱신 날짜: 2024-01-10"));

        let first = text.find("2024-01-10 │ Shop A").unwrap();
        let second = text.find("2024-01-01 │ Shop A").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_page_json_shape() {
        let page = render(&snapshot(LEDGER), Some("Shop C"), &Settings::default());
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["title"], PAGE_TITLE);
        assert_eq!(json["body"]["kind"], "notice");
        assert_eq!(json["body"]["level"], "no_history");
        assert_eq!(json["body"]["store"], "Shop C");
    }
}
