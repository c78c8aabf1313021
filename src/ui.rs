use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use prepaid_ledger::{handle, Body, Detail, LedgerSource, Notice, Page, Selector, Settings};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

pub struct App {
    source: Box<dyn LedgerSource>,
    settings: Settings,
    /// Store the user asked for last; survives failed reloads
    requested: Option<String>,
    pub page: Page,
    pub selector_state: ListState,
    pub history_state: TableState,
    pub show_history: bool,
}

impl App {
    pub fn new(source: Box<dyn LedgerSource>, settings: Settings) -> Self {
        let page = handle(source.as_ref(), &settings, None);
        let mut app = Self {
            source,
            settings,
            requested: None,
            page,
            selector_state: ListState::default(),
            history_state: TableState::default(),
            show_history: false,
        };
        app.sync_state();
        app
    }

    /// Re-run the whole pipeline for the current selection.
    pub fn reload(&mut self) {
        let requested = self
            .requested
            .clone()
            .or_else(|| self.page.selected_store().map(str::to_string));
        self.page = handle(self.source.as_ref(), &self.settings, requested.as_deref());
        self.sync_state();
    }

    pub fn select_store(&mut self, store: &str) {
        self.requested = Some(store.to_string());
        self.reload();
    }

    pub fn next(&mut self) {
        let Some((options, selected)) = self.options() else {
            return;
        };
        let i = match selected {
            Some(i) if i + 1 < options.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.select_store(&options[i]);
    }

    pub fn previous(&mut self) {
        let Some((options, selected)) = self.options() else {
            return;
        };
        let i = match selected {
            Some(0) | None => options.len() - 1,
            Some(i) => i - 1,
        };
        self.select_store(&options[i]);
    }

    pub fn toggle_history(&mut self) {
        self.show_history = !self.show_history;
    }

    fn options(&self) -> Option<(Vec<String>, Option<usize>)> {
        let selector = self.page.selector.as_ref()?;
        if selector.options.is_empty() {
            return None;
        }
        Some((selector.options.clone(), selector.selected))
    }

    fn sync_state(&mut self) {
        let selected = self.page.selector.as_ref().and_then(|s| s.selected);
        self.selector_state.select(selected);

        let has_rows = self.page.detail().map_or(false, |d| !d.history.rows.is_empty());
        self.history_state.select(if has_rows { Some(0) } else { None });
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter | KeyCode::Char(' ') => app.toggle_history(),
                KeyCode::Char('r') => app.reload(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], &app.page);

    match app.page.selector.clone() {
        Some(selector) => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(chunks[1]);

            render_selector(f, content_chunks[0], &selector, &mut app.selector_state);
            render_body(f, content_chunks[1], app);
        }
        None => render_body(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, page: &Page) {
    let header = Paragraph::new(Line::from(Span::styled(
        page.heading.clone(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} {} ", page.icon, page.title)),
    );

    f.render_widget(header, area);
}

fn render_selector(f: &mut Frame, area: Rect, selector: &Selector, state: &mut ListState) {
    let items: Vec<ListItem> = selector
        .options
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mark = if selector.selected == Some(i) { "(•) " } else { "( ) " };
            ListItem::new(format!("{}{}", mark, name))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", selector.heading)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(list, area, state);
}

fn render_body(f: &mut Frame, area: Rect, app: &mut App) {
    match &app.page.body {
        Body::Detail(detail) => {
            let detail = detail.clone();
            render_detail(f, area, &detail, app.show_history, &mut app.history_state);
        }
        Body::Notice(Notice::NoData { message }) => render_banner(f, area, message, Color::Cyan, " Info "),
        Body::Notice(Notice::NoHistory { message, .. }) => {
            render_banner(f, area, message, Color::Yellow, " Warning ")
        }
        Body::Error { message } => render_banner(f, area, message, Color::Red, " Error "),
    }
}

fn render_banner(f: &mut Frame, area: Rect, message: &str, color: Color, title: &str) {
    let banner = Paragraph::new(Span::styled(message.to_string(), Style::default().fg(color)))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title.to_string()),
        );

    f.render_widget(banner, area);
}

fn render_detail(f: &mut Frame, area: Rect, detail: &Detail, show_history: bool, state: &mut TableState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Store heading
            Constraint::Length(4), // Metrics
            Constraint::Min(0),    // History
        ])
        .split(area);

    let heading = Paragraph::new(Span::styled(
        format!(" {}", detail.heading),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(heading, chunks[0]);

    let metric_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    for (metric, area) in [&detail.last_updated, &detail.balance].into_iter().zip(metric_chunks.iter()) {
        let value = Paragraph::new(Line::from(Span::styled(
            metric.value.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", metric.label)),
        );
        f.render_widget(value, *area);
    }

    if show_history {
        render_history(f, chunks[2], detail, state);
    } else {
        let collapsed = Paragraph::new(Line::from(vec![
            Span::styled(format!(" ▶ {}", detail.history.title), Style::default().fg(Color::Cyan)),
            Span::styled("  (Enter)", Style::default().fg(Color::DarkGray)),
        ]));
        f.render_widget(collapsed, chunks[2]);
    }
}

fn render_history(f: &mut Frame, area: Rect, detail: &Detail, state: &mut TableState) {
    let history = &detail.history;

    let header_cells = history.columns.iter().map(|h| {
        Cell::from(h.clone()).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).style(Style::default().bg(Color::DarkGray)).height(1);

    let rows = history
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|c| Cell::from(c.clone()))).height(1));

    let data_columns = history.columns.len().saturating_sub(1).max(1) as u32;
    let mut widths = vec![Constraint::Length(4)];
    widths.extend((1..history.columns.len()).map(|_| Constraint::Ratio(1, data_columns)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" ▼ {} ", history.title)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let status_spans = vec![
        Span::styled(" ↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Store | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" History | "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Reload | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepaid_ledger::{CsvFileSource, CsvTextSource};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    const LEDGER: &str = "날짜,거래처,잔액\n2024-01-01,Shop A,1000\n2024-01-05,Shop B,2000\n2024-01-10,Shop A,1500\n";

    fn app(csv: &str) -> App {
        App::new(Box::new(CsvTextSource::new(csv)), Settings::default())
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_app_starts_on_first_store() {
        let app = app(LEDGER);

        assert_eq!(app.page.selected_store(), Some("Shop A"));
        assert_eq!(app.selector_state.selected(), Some(0));
        assert_eq!(app.history_state.selected(), Some(0));
    }

    #[test]
    fn test_app_next_and_previous_wrap() {
        let mut app = app(LEDGER);

        app.next();
        assert_eq!(app.page.selected_store(), Some("Shop B"));
        assert_eq!(app.page.detail().unwrap().balance.value, "2,000 원");

        app.next();
        assert_eq!(app.page.selected_store(), Some("Shop A"));

        app.previous();
        assert_eq!(app.page.selected_store(), Some("Shop B"));
        assert_eq!(app.selector_state.selected(), Some(1));
    }

    #[test]
    fn test_app_without_stores_ignores_navigation() {
        let mut app = app("날짜,거래처,잔액\n");

        app.next();
        app.previous();

        assert_eq!(app.page.selected_store(), None);
        assert!(matches!(app.page.body, Body::Notice(Notice::NoData { .. })));
    }

    #[test]
    fn test_app_failure_keeps_running() {
        let mut app = App::new(Box::new(CsvFileSource::new("/nonexistent/ledger.csv")), Settings::default());

        assert!(app.page.is_failure());
        app.next();
        app.reload();
        assert!(app.page.is_failure());
    }

    #[test]
    fn test_draw_detail() {
        let mut app = app(LEDGER);
        let text = screen(&mut app);

        assert!(text.contains("Shop A"));
        assert!(text.contains("1,500"));
        assert!(text.contains("2024-01-10"));
        assert!(text.contains("(Enter)"));
    }

    #[test]
    fn test_draw_history_when_expanded() {
        let mut app = app(LEDGER);
        app.toggle_history();
        let text = screen(&mut app);

        assert!(text.contains("2024-01-01"));
        assert!(!text.contains("(Enter)"));
    }

    #[test]
    fn test_draw_error_banner() {
        let mut app = App::new(Box::new(CsvFileSource::new("/nonexistent/ledger.csv")), Settings::default());
        let text = screen(&mut app);

        assert!(text.contains("Error"));
        assert!(text.contains("data source unavailable"));
    }
}
