use std::path::PathBuf;

use chrono::{DateTime, Utc};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

use crate::error::Result;
use crate::fmt;
use crate::query::CategoryFilter;
use crate::session::Session;
use crate::table::{headers, rows, Field};
use crate::tui::{
    self, InteractiveView, ViewAction, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE, TAB_STYLE,
};
use crate::views::ViewId;

/// Widest a column gets before its text wraps.
const MAX_COLUMN_WIDTH: usize = 40;

enum BrowseMode {
    Normal,
    Search(String),
}

/// Tabbed browser over every populated view of a session.
pub struct SessionBrowser {
    session: Session,
    /// Files the session was loaded from, re-read on reload.
    files: Vec<PathBuf>,
    views: Vec<ViewId>,
    tab: usize,
    filter: CategoryFilter,
    search: String,
    mode: BrowseMode,
    cursor: usize,
    page_size: usize,
    date_format: String,
    now: DateTime<Utc>,
    status_message: Option<String>,
    table_state: TableState,
}

impl SessionBrowser {
    pub fn new(
        session: Session,
        files: Vec<PathBuf>,
        date_format: String,
        page_size: usize,
    ) -> Self {
        let mut browser = Self {
            session,
            files,
            views: Vec::new(),
            tab: 0,
            filter: CategoryFilter::All,
            search: String::new(),
            mode: BrowseMode::Normal,
            cursor: 0,
            page_size: page_size.max(1),
            date_format,
            now: Utc::now(),
            status_message: None,
            table_state: TableState::default(),
        };
        browser.select_initial_view();
        browser
    }

    fn select_initial_view(&mut self) {
        self.views = self.session.available_views();
        let initial = self.session.initial_view();
        self.tab = self.views.iter().position(|v| *v == initial).unwrap_or(0);
        self.filter = CategoryFilter::All;
        self.search.clear();
        self.cursor = 0;
    }

    /// Clear the session and load every file again from disk.
    fn reload(&mut self) {
        self.session.reset();
        for path in &self.files {
            // Failures are kept in the session's rejection list.
            let _ = self.session.submit_path(path);
        }
        self.select_initial_view();
        let rejected = self.session.rejections().len();
        self.status_message = Some(if rejected == 0 {
            format!("Reloaded {} file(s)", self.files.len())
        } else {
            format!("Reloaded {} file(s), {rejected} rejected", self.files.len())
        });
    }

    pub fn run(&mut self) -> Result<()> {
        if self.views.is_empty() {
            println!("Nothing to browse.");
            return Ok(());
        }
        tui::run_view(self)
    }

    pub fn current_view(&self) -> ViewId {
        self.views.get(self.tab).copied().unwrap_or(ViewId::Empty)
    }

    fn current_rows(&self) -> Vec<Vec<Field>> {
        let data = self.session.get_view(self.current_view(), &self.filter, &self.search);
        rows(&data, &self.date_format, self.now)
    }

    fn row_count(&self) -> usize {
        let view = self.current_view();
        if view == ViewId::Membership {
            // Transposed: one line per field.
            self.current_rows().len() * headers(view).len()
        } else {
            self.session
                .get_view(view, &self.filter, &self.search)
                .matched_count()
        }
    }

    fn switch_tab(&mut self, forward: bool) {
        if self.views.is_empty() {
            return;
        }
        let n = self.views.len();
        self.tab = if forward {
            (self.tab + 1) % n
        } else {
            (self.tab + n - 1) % n
        };
        self.filter = CategoryFilter::All;
        self.search.clear();
        self.cursor = 0;
    }

    /// Step the filter through "all" and then each category of the view.
    fn cycle_filter(&mut self) {
        let data = self.session.get_view(self.current_view(), &CategoryFilter::All, "");
        let vocab = data.categories();
        let next = match &self.filter {
            CategoryFilter::All => vocab.first().cloned(),
            CategoryFilter::Exact(current) => vocab
                .iter()
                .position(|c| c == current)
                .and_then(|i| vocab.get(i + 1))
                .cloned(),
        };
        self.filter = next.map(CategoryFilter::Exact).unwrap_or_default();
        self.cursor = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, count as isize - 1) as usize;
    }

    fn status_line(&self) -> String {
        let view = self.current_view();
        let data = self.session.get_view(view, &self.filter, &self.search);
        let mut parts = vec![format!(
            "Showing {} of {} {}",
            data.matched_count(),
            data.total_count(),
            view.noun()
        )];
        if !self.filter.is_all() {
            parts.push(format!("Filter: {}", self.filter));
        }
        if !self.search.is_empty() {
            parts.push(format!("Search: {}", self.search));
        }
        for (projection, total) in self.session.aggregates(view) {
            parts.push(format!("{}: {}", projection.label(), fmt::aggregate(projection, total)));
        }
        if let Some(ref msg) = self.status_message {
            parts.push(msg.clone());
        }
        parts.join(" | ")
    }

    fn table_rows(&self) -> (Vec<Row<'static>>, Vec<Constraint>, Vec<&'static str>) {
        let view = self.current_view();
        let body = self.current_rows();
        let cols = headers(view);

        if view == ViewId::Membership {
            let lines: Vec<Row> = body
                .iter()
                .flat_map(move |row| {
                    cols.iter().zip(row).map(|(label, field)| {
                        Row::new(vec![Cell::from(*label), Cell::from(tui::field_span(field))])
                    })
                })
                .collect();
            let widths = vec![Constraint::Length(18), Constraint::Fill(1)];
            return (lines, widths, vec!["Field", "Value"]);
        }

        let widths: Vec<usize> = cols
            .iter()
            .enumerate()
            .map(|(i, h)| {
                body.iter()
                    .filter_map(|r| r.get(i))
                    .map(|f| f.text.chars().count())
                    .chain(std::iter::once(h.len()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect();

        let table_rows = body
            .iter()
            .map(|row| {
                let mut height = 1u16;
                let cells: Vec<Cell> = row
                    .iter()
                    .zip(&widths)
                    .map(|(field, width)| {
                        let (text, lines) = tui::wrap_text(&field.text, *width);
                        height = height.max(lines);
                        Cell::from(Line::styled(text, tui::tone_style(field.tone)))
                    })
                    .collect();
                Row::new(cells).height(height)
            })
            .collect();
        let constraints = widths.iter().map(|w| Constraint::Length(*w as u16)).collect();
        (table_rows, constraints, cols.to_vec())
    }

    fn input_push(&mut self, c: char) {
        if let BrowseMode::Search(s) = &mut self.mode {
            s.push(c);
        }
    }

    fn input_backspace(&mut self) {
        if let BrowseMode::Search(s) = &mut self.mode {
            s.pop();
        }
    }

    fn submit_search(&mut self) {
        let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
        if let BrowseMode::Search(input) = mode {
            self.search = input.trim().to_string();
            self.cursor = 0;
        }
    }
}

impl InteractiveView for SessionBrowser {
    fn draw(&mut self, frame: &mut Frame) {
        let areas = Layout::vertical([
            Constraint::Length(1), // tabs
            Constraint::Fill(1),   // table
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(frame.area());

        let titles: Vec<&str> = self.views.iter().map(|v| v.title()).collect();
        frame.render_widget(
            Tabs::new(titles)
                .select(self.tab)
                .style(FOOTER_STYLE)
                .highlight_style(TAB_STYLE),
            areas[0],
        );

        let (body, widths, header) = self.table_rows();
        if body.is_empty() {
            let msg = format!("No {} match.", self.current_view().noun());
            frame.render_widget(Paragraph::new(msg).style(FOOTER_STYLE), areas[1]);
        } else {
            self.table_state.select(Some(self.cursor));
            let table = Table::new(body, widths)
                .header(Row::new(header).style(HEADER_STYLE).bottom_margin(1))
                .column_spacing(1)
                .row_highlight_style(SELECTED_STYLE);
            frame.render_stateful_widget(table, areas[1], &mut self.table_state);
        }

        frame.render_widget(
            Paragraph::new(self.status_line()).style(FOOTER_STYLE),
            areas[2],
        );

        let keys = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "tab/\u{2190}/\u{2192}:view  \u{2191}/\u{2193}:select  c:category  /:search  x:clear  r:reload  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::Search(input) => Paragraph::new(format!("Search: {input}\u{2588}")),
        };
        frame.render_widget(keys, areas[3]);
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
                KeyCode::Tab | KeyCode::Right => self.switch_tab(true),
                KeyCode::BackTab | KeyCode::Left => self.switch_tab(false),
                KeyCode::Down => self.move_cursor(1),
                KeyCode::Up => self.move_cursor(-1),
                KeyCode::PageDown => self.move_cursor(self.page_size as isize),
                KeyCode::PageUp => self.move_cursor(-(self.page_size as isize)),
                KeyCode::Home => self.cursor = 0,
                KeyCode::End => self.move_cursor(isize::MAX / 2),
                KeyCode::Char('c') => self.cycle_filter(),
                KeyCode::Char('/') => self.mode = BrowseMode::Search(self.search.clone()),
                KeyCode::Char('r') => self.reload(),
                KeyCode::Char('x') => {
                    self.filter = CategoryFilter::All;
                    self.search.clear();
                    self.cursor = 0;
                }
                _ => {}
            },
            BrowseMode::Search(_) => match code {
                KeyCode::Esc => self.mode = BrowseMode::Normal,
                KeyCode::Enter => self.submit_search(),
                KeyCode::Backspace => self.input_backspace(),
                KeyCode::Char(c) => self.input_push(c),
                _ => {}
            },
        }
        ViewAction::Continue
    }
}
