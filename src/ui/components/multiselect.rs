//! Checkbox list used by the facet and column popups.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::ui::theme::theme;

/// A selectable entry.
#[derive(Debug, Clone)]
pub struct SelectItem {
    /// Value reported back when the entry is toggled.
    pub id: String,
    /// Text shown next to the checkbox.
    pub label: String,
}

impl SelectItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A titled list of checkboxes with a cursor.
///
/// The widget only displays the checked set; owners decide what a toggle
/// means and push the result back with [`set_selected`](Self::set_selected).
pub struct MultiSelect {
    items: Vec<SelectItem>,
    selected: HashSet<String>,
    cursor: usize,
    title: String,
    list_state: ListState,
}

impl MultiSelect {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            selected: HashSet::new(),
            cursor: 0,
            title: title.into(),
            list_state: ListState::default().with_selected(Some(0)),
        }
    }

    /// Replace the entries and move the cursor to the top.
    pub fn set_items(&mut self, items: Vec<SelectItem>) {
        self.items = items;
        self.cursor = 0;
        self.list_state.select(Some(0));
    }

    pub fn set_selected(&mut self, selected: HashSet<String>) {
        self.selected = selected;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Entry ids in display order.
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.id.as_str())
    }

    /// The entry under the cursor.
    pub fn current_item(&self) -> Option<&SelectItem> {
        self.items.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.list_state.select(Some(cursor));
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.set_cursor(self.cursor - 1);
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.set_cursor(self.cursor + 1);
        }
    }

    pub fn move_to_start(&mut self) {
        self.set_cursor(0);
    }

    pub fn move_to_end(&mut self) {
        if !self.items.is_empty() {
            self.set_cursor(self.items.len() - 1);
        }
    }

    /// Handle cursor movement keys. Returns true if the key was used.
    pub fn handle_navigation(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => self.move_down(),
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => self.move_up(),
            (KeyCode::Home, _) | (KeyCode::Char('g'), KeyModifiers::NONE) => self.move_to_start(),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => self.move_to_end(),
            _ => return false,
        }
        true
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let t = theme();
        let border = if focused { t.border_focused } else { t.border };

        let title = if self.selected.is_empty() {
            format!(" {} ", self.title)
        } else {
            format!(" {} ({}) ", self.title, self.selected.len())
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        if self.items.is_empty() {
            let empty = ListItem::new(Span::styled(
                "No options available",
                Style::default().fg(t.muted),
            ));
            frame.render_widget(List::new(vec![empty]).block(block), area);
            return;
        }

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                let checked = self.selected.contains(&item.id);
                let (mark, style) = if checked {
                    ("[x]", Style::default().fg(t.success))
                } else {
                    ("[ ]", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::raw(" "),
                    Span::raw(item.label.clone()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(t.selection)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select() -> MultiSelect {
        let mut ms = MultiSelect::new("Status");
        ms.set_items(vec![
            SelectItem::new("draft", "Draft"),
            SelectItem::new("approved", "Approved"),
            SelectItem::new("cancelled", "Cancelled"),
        ]);
        ms
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut ms = select();
        ms.move_up();
        assert_eq!(ms.current_item().map(|i| i.id.as_str()), Some("draft"));
        ms.move_to_end();
        ms.move_down();
        assert_eq!(ms.current_item().map(|i| i.id.as_str()), Some("cancelled"));
        ms.move_to_start();
        assert_eq!(ms.current_item().map(|i| i.id.as_str()), Some("draft"));
    }

    #[test]
    fn test_navigation_keys() {
        let mut ms = select();
        assert!(ms.handle_navigation(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)));
        assert_eq!(ms.current_item().map(|i| i.id.as_str()), Some("approved"));
        assert!(ms.handle_navigation(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE)));
        assert_eq!(ms.current_item().map(|i| i.id.as_str()), Some("draft"));
        assert!(!ms.handle_navigation(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_selected_set_is_display_only() {
        let mut ms = select();
        ms.set_selected(["approved".to_string()].into_iter().collect());
        assert!(ms.is_selected("approved"));
        assert!(!ms.is_selected("draft"));
        assert_eq!(ms.selected_count(), 1);
    }

    #[test]
    fn test_empty_list_is_safe() {
        let mut ms = MultiSelect::new("Empty");
        ms.move_down();
        ms.move_up();
        ms.move_to_end();
        assert!(ms.current_item().is_none());
        assert!(ms.is_empty());
    }
}
