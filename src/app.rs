//! Application state and update loop.
//!
//! Follows The Elm Architecture: [`App::update`] folds events into state,
//! [`App::handle_api_message`] folds background results in, and
//! [`App::view`] draws the current state.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::api::FrappeClient;
use crate::cache::ViewStateStore;
use crate::config::{Profile, Settings};
use crate::domain::DoctypeKind;
use crate::error::Result;
use crate::events::Event;
use crate::export::CsvExporter;
use crate::tasks::{ApiMessage, TaskSpawner};
use crate::ui::{
    render_context_help, theme, DoctypeView, Fetch, NotificationManager, Spinner, ViewAction,
};

/// State of the link to the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Connecting,
    Connected(String),
    Failed(String),
}

pub struct App {
    profile: Profile,
    views: Vec<DoctypeView>,
    active: usize,
    client: Option<FrappeClient>,
    connection: Connection,
    spawner: TaskSpawner,
    store: ViewStateStore,
    exporter: CsvExporter,
    notifications: NotificationManager,
    spinner: Spinner,
    should_quit: bool,
}

impl App {
    /// Build one tab per doctype, restoring each table's saved view.
    pub fn new(
        profile: Profile,
        settings: &Settings,
        store: ViewStateStore,
        spawner: TaskSpawner,
        initial: Option<DoctypeKind>,
    ) -> Result<Self> {
        let views = DoctypeKind::ALL
            .iter()
            .map(|&kind| DoctypeView::new(kind, settings, store.get(kind.namespace())))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let active = initial
            .and_then(|kind| DoctypeKind::ALL.iter().position(|&k| k == kind))
            .unwrap_or(0);
        debug!(profile = %profile.name, active, "Creating application");

        Ok(Self {
            profile,
            views,
            active,
            client: None,
            connection: Connection::Connecting,
            spawner,
            store,
            exporter: CsvExporter::new(settings.export_dir()),
            notifications: NotificationManager::new(),
            spinner: Spinner::new(),
            should_quit: false,
        })
    }

    /// Start the connection check. Fetches begin once it succeeds.
    pub fn connect(&mut self) {
        info!(profile = %self.profile.name, url = %self.profile.url, "Connecting");
        self.connection = Connection::Connecting;
        self.spawner.spawn_connect(self.profile.clone());
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn active_kind(&self) -> DoctypeKind {
        self.views[self.active].kind()
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    fn view_mut(&mut self, kind: DoctypeKind) -> Option<&mut DoctypeView> {
        self.views.iter_mut().find(|v| v.kind() == kind)
    }

    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => self.quit(),
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key(key, Instant::now());
            }
            Event::Resize(width, height) => trace!(width, height, "Terminal resized"),
            Event::Tick => self.handle_tick(Instant::now()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if !self.views[self.active].captures_input() {
            match (key.code, key.modifiers) {
                (KeyCode::Char('q'), KeyModifiers::NONE) => {
                    self.quit();
                    return;
                }
                (KeyCode::Tab, _) => {
                    self.active = (self.active + 1) % self.views.len();
                    return;
                }
                (KeyCode::BackTab, _) => {
                    self.active = (self.active + self.views.len() - 1) % self.views.len();
                    return;
                }
                (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
                    let index = c as usize - '1' as usize;
                    if index < self.views.len() {
                        self.active = index;
                    }
                    return;
                }
                (KeyCode::Char('r'), KeyModifiers::NONE)
                    if matches!(self.connection, Connection::Failed(_)) =>
                {
                    self.connect();
                    return;
                }
                _ => {}
            }
        }

        let view = &mut self.views[self.active];
        if let ViewAction::Notify(notification) = view.handle_key(key, now, &self.exporter) {
            self.notifications.push_at(notification, now);
        }
    }

    fn handle_tick(&mut self, now: Instant) {
        for view in &mut self.views {
            view.tick(now);
            if let Some(query) = view.take_view_update() {
                if let Err(e) = self.store.set(view.kind().namespace(), query) {
                    warn!(error = %e, "Failed to persist view state");
                }
            }
            if let Some(client) = &self.client {
                match view.take_fetch() {
                    Some(Fetch::Page(seq, query)) => {
                        self.spawner.spawn_fetch_page(client, view.kind(), seq, query)
                    }
                    Some(Fetch::All(seq)) => self.spawner.spawn_fetch_all(client, view.kind(), seq),
                    None => {}
                }
            }
        }

        let busy = self.connection == Connection::Connecting || self.views[self.active].is_loading();
        self.spinner.tick(busy);
        self.notifications.tick(now);
    }

    /// Fold a background result into state.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::ClientConnected(Ok((client, user))) => {
                info!(user = %user, "Connected");
                self.notifications.success(format!("Connected as {}", user));
                self.connection = Connection::Connected(user);
                self.client = Some(client);
            }
            ApiMessage::ClientConnected(Err(e)) => {
                warn!(error = %e, "Connection failed");
                self.notifications.error(format!("Connection failed: {}", e));
                self.connection = Connection::Failed(e);
            }
            ApiMessage::PageFetched { kind, seq, result } => {
                let toast = self.view_mut(kind).and_then(|v| v.apply_page(seq, result));
                if let Some(n) = toast {
                    self.notifications.push(n);
                }
            }
            ApiMessage::RowsFetched { kind, seq, result } => {
                let toast = self.view_mut(kind).and_then(|v| v.apply_rows(seq, result));
                if let Some(n) = toast {
                    self.notifications.push(n);
                }
            }
        }
    }

    /// Persist every table's pending view state and stop.
    fn quit(&mut self) {
        info!("Quit requested");
        for view in &mut self.views {
            if let Some(query) = view.flush_view() {
                if let Err(e) = self.store.set(view.kind().namespace(), query) {
                    warn!(error = %e, "Failed to persist view state");
                }
            }
        }
        self.should_quit = true;
    }

    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        let view = &mut self.views[self.active];
        view.render(frame, chunks[1]);
        render_context_help(frame, chunks[2], view.hint_context(), view.has_reports());
        self.notifications.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let status = match &self.connection {
            Connection::Connecting => Span::styled(
                format!("{} connecting to {}", self.spinner.frame(), self.profile.url),
                Style::default().fg(t.muted),
            ),
            Connection::Connected(user) => {
                let prefix = if self.views[self.active].is_loading() {
                    format!("{} ", self.spinner.frame())
                } else {
                    String::new()
                };
                Span::styled(
                    format!("{}{} @ {}", prefix, user, self.profile.name),
                    Style::default().fg(t.success),
                )
            }
            Connection::Failed(_) => Span::styled(
                format!("offline ({}) [r] retry", self.profile.name),
                Style::default().fg(t.error),
            ),
        };
        let status_width = status.width() as u16 + 1;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(status_width)])
            .split(area);

        let titles: Vec<Line> = self
            .views
            .iter()
            .enumerate()
            .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.kind().title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.active)
            .style(Style::default().fg(t.muted))
            .highlight_style(Style::default().fg(t.accent).add_modifier(Modifier::BOLD))
            .divider("│");
        frame.render_widget(tabs, chunks[0]);
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Auth, AuthScheme};
    use crate::tasks::create_task_channel;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::{json, Value};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let (_rx, spawner) = create_task_channel();
        App::new(
            Profile::new("test", "https://erp.example.com", "k"),
            &Settings::default(),
            ViewStateStore::in_memory(),
            spawner,
            None,
        )
        .unwrap()
    }

    fn client() -> FrappeClient {
        FrappeClient::with_auth("http://127.0.0.1:9", Auth::new("k", "s", AuthScheme::Token)).unwrap()
    }

    #[test]
    fn test_initial_tab_follows_argument() {
        let (_rx, spawner) = create_task_channel();
        let app = App::new(
            Profile::new("test", "https://erp.example.com", "k"),
            &Settings::default(),
            ViewStateStore::in_memory(),
            spawner,
            Some(DoctypeKind::Projects),
        )
        .unwrap();
        assert_eq!(app.active_kind(), DoctypeKind::Projects);
    }

    #[test]
    fn test_tab_switching_wraps() {
        let mut app = app();
        assert_eq!(app.active_kind(), DoctypeKind::ProcurementRequests);
        app.update(key(KeyCode::BackTab));
        assert_eq!(app.active_kind(), DoctypeKind::ProjectPayments);
        app.update(key(KeyCode::Tab));
        assert_eq!(app.active_kind(), DoctypeKind::ProcurementRequests);
        app.update(key(KeyCode::Char('4')));
        assert_eq!(app.active_kind(), DoctypeKind::Projects);
    }

    #[test]
    fn test_q_quits_outside_search() {
        let mut app = app();
        app.update(key(KeyCode::Char('/')));
        app.update(key(KeyCode::Char('q')));
        assert!(!app.should_quit());
        app.update(key(KeyCode::Esc));
        app.update(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_event() {
        let mut app = app();
        app.update(Event::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_connection_failure_is_reported() {
        let mut app = app();
        app.handle_api_message(ApiMessage::ClientConnected(Err("HTTP 401".to_string())));
        assert_eq!(app.connection(), &Connection::Failed("HTTP 401".to_string()));
        assert!(app
            .notifications()
            .iter()
            .any(|n| n.message == "Connection failed: HTTP 401"));
    }

    #[tokio::test]
    async fn test_connected_tick_issues_fetches() {
        let (mut rx, spawner) = create_task_channel();
        let mut app = App::new(
            Profile::new("test", "http://127.0.0.1:9", "k"),
            &Settings::default(),
            ViewStateStore::in_memory(),
            spawner,
            None,
        )
        .unwrap();
        app.handle_api_message(ApiMessage::ClientConnected(Ok((client(), "ops@example.com".to_string()))));
        assert_eq!(app.connection(), &Connection::Connected("ops@example.com".to_string()));

        app.update(Event::Tick);
        assert!(app.views.iter().all(|v| v.is_loading()));

        // Every tab reports back, each with a failure.
        for _ in 0..DoctypeKind::ALL.len() {
            let message = rx.recv().await.unwrap();
            app.handle_api_message(message);
        }
        assert!(app.views.iter().all(|v| !v.is_loading()));
        assert!(app.views.iter().all(|v| v.table().error().is_some()));
    }

    #[test]
    fn test_rows_reach_matching_tab() {
        let mut app = app();
        let row = match json!({"name": "PAY-1", "status": "Paid", "amount": 5}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let view = app.view_mut(DoctypeKind::ProjectPayments).unwrap();
        let Some(Fetch::All(seq)) = view.take_fetch() else {
            panic!("expected a full load");
        };
        app.handle_api_message(ApiMessage::RowsFetched {
            kind: DoctypeKind::ProjectPayments,
            seq,
            result: Ok(vec![row]),
        });
        let view = app.view_mut(DoctypeKind::ProjectPayments).unwrap();
        assert_eq!(view.table().rows().len(), 1);
    }

    #[test]
    fn test_view_state_persists_on_quit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view_state.json");
        let (_rx, spawner) = create_task_channel();
        let mut app = App::new(
            Profile::new("test", "https://erp.example.com", "k"),
            &Settings::default(),
            ViewStateStore::open_at(path.clone()),
            spawner,
            Some(DoctypeKind::PurchaseOrders),
        )
        .unwrap();

        app.update(key(KeyCode::Char('s')));
        app.update(Event::Quit);
        assert_eq!(
            ViewStateStore::open_at(path).get("po"),
            Some("po_pageIdx=0&po_rows=20")
        );
    }

    #[test]
    fn test_view_renders_tabs_and_hints() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(140, 20)).unwrap();
        terminal.draw(|f| app.view(f)).unwrap();
        let buffer = terminal.backend().buffer();
        let line = |y: u16| -> String { (0..140).map(|x| buffer[(x, y)].symbol().to_string()).collect() };
        assert!(line(0).contains("1 Procurement Requests"));
        assert!(line(0).contains("connecting to https://erp.example.com"));
        assert!(line(19).contains("[j/k]"));
    }
}
