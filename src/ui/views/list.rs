//! One doctype tab: a data table plus its popups and key handling.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, warn};

use crate::api::Record;
use crate::config::Settings;
use crate::domain::DoctypeKind;
use crate::export::CsvExporter;
use crate::table::{
    DataTable, FacetAction, FacetFilterPopup, Namespace, PageNav, ServerQuery, TableError,
    ViewOptionsAction, ViewOptionsPopup, ViewParams,
};
use crate::ui::components::{HintContext, Notification};
use crate::ui::theme::theme;

/// Input focus inside the view.
enum Mode {
    Normal,
    Search,
    Facet(FacetFilterPopup),
    Columns(ViewOptionsPopup),
}

/// Work the view asks the app to start.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    /// One server-mode page.
    Page(u64, ServerQuery),
    /// Every row of a client-mode doctype.
    All(u64),
}

/// Result of handling a key.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    None,
    Notify(Notification),
}

pub struct DoctypeView {
    kind: DoctypeKind,
    table: DataTable<Record>,
    mode: Mode,
    report_index: usize,
    load_seq: u64,
    load_pending: bool,
}

impl DoctypeView {
    /// Build the view, restoring saved page, size and search when present.
    pub fn new(
        kind: DoctypeKind,
        settings: &Settings,
        saved_view: Option<&str>,
    ) -> Result<Self, TableError> {
        let mut table = kind.build_table(settings.search_debounce())?;
        let query = match saved_view {
            Some(query) => query.to_string(),
            None => ViewParams {
                page_size: settings.page_size,
                ..ViewParams::default()
            }
            .to_query(&Namespace::new(kind.namespace())?),
        };
        table.restore_view(&query);

        Ok(Self {
            kind,
            table,
            mode: Mode::Normal,
            report_index: 0,
            load_seq: 0,
            load_pending: !kind.is_server_mode(),
        })
    }

    pub fn kind(&self) -> DoctypeKind {
        self.kind
    }

    pub fn table(&self) -> &DataTable<Record> {
        &self.table
    }

    pub fn is_loading(&self) -> bool {
        self.table.is_loading()
    }

    /// Whether keys should go to the view before global shortcuts.
    pub fn captures_input(&self) -> bool {
        !matches!(self.mode, Mode::Normal)
    }

    pub fn hint_context(&self) -> HintContext {
        match self.mode {
            Mode::Normal => HintContext::Table,
            Mode::Search => HintContext::Search,
            Mode::Facet(_) | Mode::Columns(_) => HintContext::Popup,
        }
    }

    pub fn has_reports(&self) -> bool {
        !self.kind.report_types().is_empty()
    }

    /// The report type `E` exports.
    pub fn report_type(&self) -> Option<&'static str> {
        self.kind.report_types().get(self.report_index).copied()
    }

    /// Advance debounced work.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.table.tick(now)
    }

    /// Next fetch to run, if state changed since the last one.
    pub fn take_fetch(&mut self) -> Option<Fetch> {
        if self.table.is_server_mode() {
            return self.table.take_query().map(|(seq, q)| Fetch::Page(seq, q));
        }
        if !self.load_pending {
            return None;
        }
        self.load_pending = false;
        self.load_seq += 1;
        self.table.set_loading(true);
        Some(Fetch::All(self.load_seq))
    }

    /// Ask for fresh data on the next [`take_fetch`](Self::take_fetch).
    pub fn reload(&mut self) {
        if self.table.is_server_mode() {
            self.table.refresh();
        } else {
            self.load_pending = true;
        }
    }

    /// Apply a fetched page. Returns a toast for failures of the latest query.
    pub fn apply_page(
        &mut self,
        seq: u64,
        result: Result<(Vec<Record>, usize), String>,
    ) -> Option<Notification> {
        match result {
            Ok((rows, total)) => {
                self.table.apply_server_page(seq, rows, total);
                None
            }
            Err(e) => self
                .table
                .apply_server_error(seq, e.clone())
                .then(|| Notification::error(format!("{}: {}", self.kind.title(), e))),
        }
    }

    /// Apply a full client-mode load. Superseded loads are dropped.
    pub fn apply_rows(&mut self, seq: u64, result: Result<Vec<Record>, String>) -> Option<Notification> {
        if seq != self.load_seq {
            debug!(seq, latest = self.load_seq, "Dropping stale load");
            return None;
        }
        match result {
            Ok(rows) => {
                self.table.set_rows(rows);
                None
            }
            Err(e) => {
                warn!(kind = ?self.kind, error = %e, "Load failed");
                self.table.set_error(Some(e.clone()));
                Some(Notification::error(format!("{}: {}", self.kind.title(), e)))
            }
        }
    }

    /// Committed view-state query string, if it changed.
    pub fn take_view_update(&mut self) -> Option<String> {
        self.table.take_view_update()
    }

    /// Commit pending view state now, e.g. before exit.
    pub fn flush_view(&mut self) -> Option<String> {
        self.table.flush_view();
        self.table.take_view_update()
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant, exporter: &CsvExporter) -> ViewAction {
        if matches!(self.mode, Mode::Normal) {
            return self.handle_normal_key(key, now, exporter);
        }
        match &mut self.mode {
            Mode::Normal => ViewAction::None,
            Mode::Search => {
                match key.code {
                    KeyCode::Enter => self.mode = Mode::Normal,
                    KeyCode::Esc => {
                        self.table.set_search_input("", now);
                        self.mode = Mode::Normal;
                    }
                    KeyCode::Backspace => self.table.pop_search_char(now),
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.table.push_search_char(c, now)
                    }
                    _ => {}
                }
                ViewAction::None
            }
            Mode::Facet(popup) => {
                let column = popup.column_id().to_string();
                match popup.handle_input(key) {
                    Some(FacetAction::Toggle(value)) => {
                        self.table.toggle_facet(&column, &value);
                    }
                    Some(FacetAction::Clear) => {
                        self.table.clear_facet(&column);
                    }
                    Some(FacetAction::Close) => self.mode = Mode::Normal,
                    None => {}
                }
                if let Mode::Facet(popup) = &mut self.mode {
                    popup.sync(self.table.state().filter_value(&column));
                }
                ViewAction::None
            }
            Mode::Columns(popup) => {
                match popup.handle_input(key) {
                    Some(ViewOptionsAction::Toggle(column)) => {
                        self.table.toggle_visibility(&column);
                        popup.sync(self.table.state());
                    }
                    Some(ViewOptionsAction::Close) => self.mode = Mode::Normal,
                    None => {}
                }
                ViewAction::None
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, now: Instant, exporter: &CsvExporter) -> ViewAction {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => self.table.move_down(),
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => self.table.move_up(),
            (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => {
                self.table.focus_next_column()
            }
            (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => {
                self.table.focus_prev_column()
            }
            (KeyCode::Char(' '), _) if self.table.options().show_export_button => {
                self.table.toggle_cursor_selection()
            }
            (KeyCode::Char('a'), KeyModifiers::CONTROL) if self.table.options().show_export_button => {
                self.table.toggle_page_selection()
            }
            (KeyCode::Char('x'), KeyModifiers::NONE) => self.table.clear_selection(),
            (KeyCode::Char('n'), KeyModifiers::NONE) | (KeyCode::PageDown, _) => {
                self.table.navigate(PageNav::Next);
            }
            (KeyCode::Char('p'), KeyModifiers::NONE) | (KeyCode::PageUp, _) => {
                self.table.navigate(PageNav::Previous);
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.table.navigate(PageNav::First);
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.table.navigate(PageNav::Last);
            }
            (KeyCode::Char('s'), KeyModifiers::NONE) => self.table.cycle_page_size(),
            (KeyCode::Char('o'), KeyModifiers::NONE) => self.table.cycle_sort_focused(),
            (KeyCode::Char('/'), _) => self.mode = Mode::Search,
            (KeyCode::Char('f'), KeyModifiers::NONE) => return self.open_facet_popup(),
            (KeyCode::Char('v'), KeyModifiers::NONE) => {
                self.mode = Mode::Columns(ViewOptionsPopup::new(
                    self.table.columns(),
                    self.table.state(),
                ));
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => self.reload(),
            (KeyCode::Char('e'), KeyModifiers::NONE) => {
                return ViewAction::Notify(self.table.export_selected(exporter).notification());
            }
            (KeyCode::Char('E'), _) => {
                let Some(report_type) = self.report_type() else {
                    return ViewAction::Notify(Notification::info("No reports for this table"));
                };
                return ViewAction::Notify(
                    self.table.export_report(exporter, report_type).notification(),
                );
            }
            (KeyCode::Char('R'), _) if self.has_reports() => {
                self.report_index = (self.report_index + 1) % self.kind.report_types().len();
                if let Some(report_type) = self.report_type() {
                    return ViewAction::Notify(Notification::info(format!(
                        "Report type: {}",
                        report_type
                    )));
                }
            }
            (KeyCode::Esc, _) if !self.table.search_input().is_empty() => {
                self.table.set_search_input("", now);
            }
            _ => {}
        }
        ViewAction::None
    }

    /// Open the facet popup for the focused column, or the first faceted one.
    fn open_facet_popup(&mut self) -> ViewAction {
        let facets = self.table.facet_columns();
        let column = match self.table.focused_column_id() {
            Some(id) if facets.contains(&id) => id.to_string(),
            _ => match facets.first() {
                Some(id) => id.to_string(),
                None => return ViewAction::Notify(Notification::info("No filters for this table")),
            },
        };
        let title = self
            .table
            .columns()
            .iter()
            .find(|c| c.id == column)
            .map(|c| c.header.clone())
            .unwrap_or_else(|| column.clone());
        let popup = FacetFilterPopup::new(
            column.clone(),
            title,
            self.table.facet_options(&column),
            self.table.state().filter_value(&column),
        );
        self.mode = Mode::Facet(popup);
        ViewAction::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let (banner, body) = match self.table.error() {
            Some(error) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Min(0)])
                    .split(area);
                let line = Line::from(vec![
                    Span::styled(
                        "Failed to load: ",
                        Style::default().fg(t.error).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(error.to_string(), Style::default().fg(t.error)),
                    Span::styled("  [r] retry", Style::default().fg(t.muted)),
                ]);
                (Some((line, chunks[0])), chunks[1])
            }
            None => (None, area),
        };
        if let Some((line, rect)) = banner {
            frame.render_widget(Paragraph::new(line), rect);
        }

        let focused = matches!(self.mode, Mode::Normal | Mode::Search);
        self.table.render(frame, body, focused);

        match &mut self.mode {
            Mode::Facet(popup) => popup.render(frame, body),
            Mode::Columns(popup) => popup.render(frame, body),
            Mode::Normal | Mode::Search => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn payment(name: &str, status: &str) -> Record {
        match json!({"name": name, "project": "Tower A", "vendor": "Acme", "amount": 10,
                     "status": status, "utr": "", "creation": format!("2024-01-01 00:00:{}", &name[4..])}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn settings() -> Settings {
        Settings {
            search_debounce_ms: 5,
            ..Settings::default()
        }
    }

    fn loaded_payments() -> DoctypeView {
        let mut view = DoctypeView::new(DoctypeKind::ProjectPayments, &settings(), None).unwrap();
        let Some(Fetch::All(seq)) = view.take_fetch() else {
            panic!("expected a full load");
        };
        view.apply_rows(
            seq,
            Ok(vec![payment("PAY-10", "Approved"), payment("PAY-11", "Paid")]),
        );
        view
    }

    #[test]
    fn test_client_view_loads_once_and_drops_stale() {
        let mut view = DoctypeView::new(DoctypeKind::ProjectPayments, &settings(), None).unwrap();
        assert_eq!(view.take_fetch(), Some(Fetch::All(1)));
        assert!(view.is_loading());
        assert_eq!(view.take_fetch(), None);

        view.reload();
        assert_eq!(view.take_fetch(), Some(Fetch::All(2)));
        assert!(view.apply_rows(1, Err("old".to_string())).is_none());
        assert!(view.is_loading());
        view.apply_rows(2, Ok(vec![payment("PAY-10", "Approved")]));
        assert!(!view.is_loading());
        assert_eq!(view.table().rows().len(), 1);
    }

    #[test]
    fn test_server_view_restores_saved_page() {
        let mut view =
            DoctypeView::new(DoctypeKind::PurchaseOrders, &settings(), Some("po_pageIdx=2&po_rows=20"))
                .unwrap();
        match view.take_fetch() {
            Some(Fetch::Page(seq, query)) => {
                assert_eq!(seq, 1);
                assert_eq!(query.limit_start, 40);
                assert_eq!(query.limit_page_length, 20);
            }
            other => panic!("unexpected fetch {:?}", other),
        }
    }

    #[test]
    fn test_configured_page_size_applies_without_saved_state() {
        let s = Settings {
            page_size: 30,
            ..settings()
        };
        let view = DoctypeView::new(DoctypeKind::Projects, &s, None).unwrap();
        assert_eq!(view.table().state().pagination.page_size, 30);
    }

    #[test]
    fn test_server_error_becomes_toast_and_banner() {
        let mut view = DoctypeView::new(DoctypeKind::Projects, &settings(), None).unwrap();
        let Some(Fetch::Page(seq, _)) = view.take_fetch() else {
            panic!("expected a page fetch");
        };
        let toast = view.apply_page(seq, Err("HTTP 500".to_string())).unwrap();
        assert!(toast.message.contains("Projects: HTTP 500"));
        assert_eq!(view.table().error(), Some("HTTP 500"));

        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let top: String = (0..100)
            .map(|x| terminal.backend().buffer()[(x, 0)].symbol().to_string())
            .collect();
        assert!(top.starts_with("Failed to load: HTTP 500"));
    }

    #[test]
    fn test_search_mode_captures_keys() {
        let exporter = CsvExporter::new(std::env::temp_dir());
        let mut view = loaded_payments();
        let now = Instant::now();

        view.handle_key(key(KeyCode::Char('/')), now, &exporter);
        assert!(view.captures_input());
        for c in "PAY-11".chars() {
            view.handle_key(key(KeyCode::Char(c)), now, &exporter);
        }
        view.handle_key(key(KeyCode::Enter), now, &exporter);
        assert!(!view.captures_input());
        assert_eq!(view.table().search_input(), "PAY-11");

        assert!(view.tick(now + Duration::from_millis(10)));
        assert_eq!(view.table().filtered_count(), 1);
    }

    #[test]
    fn test_facet_popup_toggles_filter() {
        let exporter = CsvExporter::new(std::env::temp_dir());
        let mut view = loaded_payments();
        let now = Instant::now();

        view.handle_key(key(KeyCode::Char('f')), now, &exporter);
        assert_eq!(view.hint_context(), HintContext::Popup);
        // Options are Requested, Approved, Paid, Rejected.
        view.handle_key(key(KeyCode::Char('j')), now, &exporter);
        view.handle_key(key(KeyCode::Char(' ')), now, &exporter);
        assert_eq!(
            view.table().state().filter_value("status"),
            Some(&["Approved".to_string()][..])
        );
        assert_eq!(view.table().filtered_count(), 1);

        view.handle_key(key(KeyCode::Char('c')), now, &exporter);
        assert_eq!(view.table().state().filter_value("status"), None);
        view.handle_key(key(KeyCode::Esc), now, &exporter);
        assert!(!view.captures_input());
    }

    #[test]
    fn test_export_without_selection_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let mut view = loaded_payments();
        match view.handle_key(key(KeyCode::Char('e')), Instant::now(), &exporter) {
            ViewAction::Notify(n) => assert_eq!(n.message, "No rows selected"),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_selection_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let mut view = loaded_payments();
        let now = Instant::now();

        view.handle_key(key(KeyCode::Char(' ')), now, &exporter);
        view.handle_key(key(KeyCode::Char('e')), now, &exporter);
        assert!(dir.path().join("project_payments_selected.csv").exists());
    }

    #[test]
    fn test_report_type_cycles() {
        let exporter = CsvExporter::new(std::env::temp_dir());
        let mut view = loaded_payments();
        assert_eq!(view.report_type(), Some("bank"));
        view.handle_key(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT), Instant::now(), &exporter);
        assert_eq!(view.report_type(), Some("summary"));
        view.handle_key(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT), Instant::now(), &exporter);
        assert_eq!(view.report_type(), Some("bank"));
    }

    #[test]
    fn test_tables_without_reports_say_so() {
        let exporter = CsvExporter::new(std::env::temp_dir());
        let mut view = DoctypeView::new(DoctypeKind::Projects, &settings(), None).unwrap();
        match view.handle_key(KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT), Instant::now(), &exporter) {
            ViewAction::Notify(n) => assert!(n.message.contains("No reports")),
            other => panic!("unexpected action {:?}", other),
        }
    }
}
