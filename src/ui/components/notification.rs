//! Toast messages shown in the bottom-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::theme::theme;

const TOAST_WIDTH: u16 = 48;
const MAX_VISIBLE: usize = 3;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// Neutral status, e.g. a refresh started.
    Info,
    /// A completed action such as an export.
    Success,
    /// Something the user should notice but that did not fail.
    Warning,
    /// Destructive style, used for failed exports and fetches.
    Error,
}

impl NotificationType {
    /// Glyph shown before the message.
    fn icon(self) -> &'static str {
        match self {
            NotificationType::Info => "i",
            NotificationType::Success => "✓",
            NotificationType::Warning => "!",
            NotificationType::Error => "✗",
        }
    }

    fn color(self) -> Color {
        let t = theme();
        match self {
            NotificationType::Info => t.accent,
            NotificationType::Success => t.success,
            NotificationType::Warning => t.warning,
            NotificationType::Error => t.error,
        }
    }

    /// How long a toast of this severity stays up. Problems linger longer.
    fn lifetime(self) -> Duration {
        match self {
            NotificationType::Info | NotificationType::Success => Duration::from_secs(3),
            NotificationType::Warning | NotificationType::Error => Duration::from_secs(6),
        }
    }
}

/// A single toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Text shown in the toast.
    pub message: String,
    /// Severity; picks the icon, color and default lifetime.
    pub notification_type: NotificationType,
    /// Time on screen before [`NotificationManager::tick`] drops it.
    pub lifetime: Duration,
}

impl Notification {
    /// Create a toast with the severity's default lifetime.
    pub fn new(message: impl Into<String>, notification_type: NotificationType) -> Self {
        Self {
            message: message.into(),
            notification_type,
            lifetime: notification_type.lifetime(),
        }
    }

    /// Create an info toast.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Info)
    }

    /// Create a success toast.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Success)
    }

    /// Create a warning toast.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Warning)
    }

    /// Create an error toast.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Error)
    }
}

/// Queue of live toasts. Expiry is driven by [`tick`](Self::tick).
#[derive(Debug, Default)]
pub struct NotificationManager {
    live: VecDeque<(Notification, Instant)>,
}

impl NotificationManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast. A repeat of the newest message restarts its timer
    /// instead of stacking.
    pub fn push_at(&mut self, notification: Notification, now: Instant) {
        if let Some((last, shown)) = self.live.back_mut() {
            if *last == notification {
                *shown = now;
                return;
            }
        }
        self.live.push_back((notification, now));
        while self.live.len() > MAX_VISIBLE {
            self.live.pop_front();
        }
    }

    /// Show a toast, timed from now.
    pub fn push(&mut self, notification: Notification) {
        self.push_at(notification, Instant::now());
    }

    /// Show an info toast.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::info(message));
    }

    /// Show a success toast.
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::success(message));
    }

    /// Show a warning toast.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::warning(message));
    }

    /// Show an error toast.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::error(message));
    }

    /// Drop expired toasts.
    pub fn tick(&mut self, now: Instant) {
        self.live
            .retain(|(n, shown)| now.saturating_duration_since(*shown) < n.lifetime);
    }

    /// Whether no toasts are showing.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of toasts showing.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Live toasts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.live.iter().map(|(n, _)| n)
    }

    /// Stack toasts upward from the bottom-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = TOAST_WIDTH.min(area.width);
        let inner_width = width.saturating_sub(4).max(1) as usize;
        let mut bottom = area.y + area.height;

        for (n, _) in self.live.iter().rev() {
            let text_len = n.message.chars().count() + 2;
            let lines = text_len.div_ceil(inner_width).max(1) as u16;
            let height = lines + 2;
            if bottom < area.y + height {
                break;
            }
            let rect = Rect::new(area.x + area.width - width, bottom - height, width, height);
            bottom -= height;

            let color = n.notification_type.color();
            let body = Paragraph::new(Line::from(vec![
                Span::styled(n.notification_type.icon(), Style::default().fg(color)),
                Span::raw(" "),
                Span::raw(n.message.as_str()),
            ]))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
            frame.render_widget(Clear, rect);
            frame.render_widget(body, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_lifetimes_by_severity() {
        assert_eq!(Notification::success("ok").lifetime, Duration::from_secs(3));
        assert_eq!(Notification::error("bad").lifetime, Duration::from_secs(6));
    }

    #[test]
    fn test_manager_shorthands_keep_order_and_severity() {
        let mut manager = NotificationManager::new();
        assert!(manager.is_empty());
        manager.info("fetching");
        manager.warning("slow");
        manager.error("failed");
        assert_eq!(manager.len(), 3);
        let kinds: Vec<_> = manager.iter().map(|n| n.notification_type).collect();
        assert_eq!(
            kinds,
            vec![NotificationType::Info, NotificationType::Warning, NotificationType::Error]
        );
        assert_eq!(manager.iter().next().map(|n| n.message.as_str()), Some("fetching"));
    }

    #[test]
    fn test_tick_expires_old_toasts() {
        let start = Instant::now();
        let mut m = NotificationManager::new();
        m.push_at(Notification::info("first"), start);
        m.push_at(Notification::error("second"), start);

        m.tick(start + Duration::from_secs(4));
        let left: Vec<&str> = m.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(left, vec!["second"]);

        m.tick(start + Duration::from_secs(7));
        assert!(m.is_empty());
    }

    #[test]
    fn test_repeat_restarts_timer() {
        let start = Instant::now();
        let mut m = NotificationManager::new();
        m.push_at(Notification::info("No data to export"), start);
        m.push_at(
            Notification::info("No data to export"),
            start + Duration::from_secs(2),
        );
        assert_eq!(m.len(), 1);
        m.tick(start + Duration::from_secs(4));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_queue_is_bounded() {
        let now = Instant::now();
        let mut m = NotificationManager::new();
        for i in 0..5 {
            m.push_at(Notification::info(format!("toast {}", i)), now);
        }
        assert_eq!(m.len(), MAX_VISIBLE);
        assert_eq!(m.iter().next().map(|n| n.message.as_str()), Some("toast 2"));
    }

    #[test]
    fn test_render_places_toast_bottom_right() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let mut m = NotificationManager::new();
        m.success("Exported 2 rows");
        terminal.draw(|f| m.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..80).map(|x| buffer[(x, 8)].symbol().to_string()).collect();
        assert!(row.contains("Exported 2 rows"));
        assert_eq!(buffer[(0, 8)].symbol(), " ");
    }
}
