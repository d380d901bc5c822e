//! Pagination control: derived page quantities, navigation and the footer.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::state::{PaginationState, PAGE_SIZE_OPTIONS};
use crate::ui::theme::theme;

/// Navigation requested from the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    First,
    Previous,
    Next,
    Last,
}

/// Quantities shown by the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationInfo {
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total: usize,
    /// One-based index of the first row on the page, 0 when empty.
    pub start_item: usize,
    /// One-based index of the last row on the page.
    pub end_item: usize,
    pub can_previous: bool,
    pub can_next: bool,
}

impl PaginationInfo {
    /// Derive display quantities for a page of `total` rows.
    pub fn new(pagination: &PaginationState, total: usize, loading: bool) -> Self {
        let page_count = pagination.page_count(total);
        let page_index = pagination.page_index;
        let start_item = if total == 0 {
            0
        } else {
            pagination.offset().saturating_add(1).min(total)
        };
        let end_item = page_index
            .saturating_add(1)
            .saturating_mul(pagination.page_size)
            .min(total);

        Self {
            page_index,
            page_size: pagination.page_size,
            page_count,
            total,
            start_item,
            end_item,
            can_previous: !loading && page_index > 0,
            can_next: !loading && page_index.saturating_add(1) < page_count,
        }
    }

    /// Whether a navigation action would do anything.
    pub fn is_enabled(&self, nav: PageNav) -> bool {
        match nav {
            PageNav::First | PageNav::Previous => self.can_previous,
            PageNav::Next | PageNav::Last => self.can_next,
        }
    }

    /// `Page n of m (a-b of t)`. Page 0 is shown when there are no pages.
    pub fn label(&self) -> String {
        let page = if self.page_count == 0 {
            0
        } else {
            self.page_index.saturating_add(1)
        };
        format!(
            "Page {} of {} ({}-{} of {})",
            page, self.page_count, self.start_item, self.end_item, self.total
        )
    }
}

/// Apply a navigation action. Disabled actions leave the state untouched.
///
/// Returns true if the page changed.
pub fn navigate(pagination: &mut PaginationState, info: &PaginationInfo, nav: PageNav) -> bool {
    if !info.is_enabled(nav) {
        return false;
    }
    let target = match nav {
        PageNav::First => 0,
        PageNav::Previous => pagination.page_index - 1,
        PageNav::Next => pagination.page_index + 1,
        PageNav::Last => info.page_count - 1,
    };
    let changed = target != pagination.page_index;
    pagination.page_index = target;
    changed
}

/// The page size following `current` in the selector, wrapping around.
pub fn next_page_size(current: usize) -> usize {
    PAGE_SIZE_OPTIONS
        .iter()
        .copied()
        .find(|&size| size > current)
        .unwrap_or(PAGE_SIZE_OPTIONS[0])
}

/// Render the pagination footer line.
pub fn render_pagination(frame: &mut Frame, area: Rect, info: &PaginationInfo, selected: usize) {
    let t = theme();
    let nav_style = |enabled: bool| {
        if enabled {
            Style::default().fg(t.accent)
        } else {
            Style::default().fg(t.muted)
        }
    };

    let mut spans = Vec::new();
    if selected > 0 {
        spans.push(Span::styled(
            format!("{} selected  ", selected),
            Style::default().fg(t.success),
        ));
    }
    spans.extend([
        Span::styled(format!("Rows per page: {}  ", info.page_size), Style::default().fg(t.muted)),
        Span::styled("« ", nav_style(info.can_previous)),
        Span::styled("‹ ", nav_style(info.can_previous)),
        Span::raw(info.label()),
        Span::styled(" ›", nav_style(info.can_next)),
        Span::styled(" »", nav_style(info.can_next)),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
