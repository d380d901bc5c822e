//! Column visibility popup.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, widgets::Clear, Frame};

use super::column::ColumnDef;
use super::state::TableState;
use crate::ui::components::{centered_rect, MultiSelect, SelectItem};

/// Actions returned from the view options popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOptionsAction {
    /// Flip one column's visibility.
    Toggle(String),
    /// Close the popup.
    Close,
}

/// Lists every hideable column with its visibility.
pub struct ViewOptionsPopup {
    select: MultiSelect,
}

impl ViewOptionsPopup {
    /// Build the popup from the table's columns and state.
    pub fn new<R>(columns: &[ColumnDef<R>], state: &TableState) -> Self {
        let mut select = MultiSelect::new("Toggle columns");
        select.set_items(
            columns
                .iter()
                .filter(|c| c.can_hide)
                .map(|c| {
                    let label = if c.header.is_empty() { &c.id } else { &c.header };
                    SelectItem::new(c.id.clone(), label.clone())
                })
                .collect(),
        );
        let mut popup = Self { select };
        popup.sync(state);
        popup
    }

    /// Reflect current visibility in the checkboxes.
    pub fn sync(&mut self, state: &TableState) {
        let visible: HashSet<String> = self
            .select
            .item_ids()
            .filter(|id| state.is_visible(id))
            .map(str::to_string)
            .collect();
        self.select.set_selected(visible);
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ViewOptionsAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Enter, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                Some(ViewOptionsAction::Close)
            }
            (KeyCode::Char(' '), KeyModifiers::NONE) => self
                .select
                .current_item()
                .map(|item| ViewOptionsAction::Toggle(item.id.clone())),
            _ => {
                self.select.handle_navigation(key);
                None
            }
        }
    }

    /// Render the popup centered over `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = (self.select.len() as u16 + 2).clamp(3, area.height.max(3));
        let popup = centered_rect(36, height, area);
        frame.render_widget(Clear, popup);
        self.select.render(frame, popup, true);
    }
}
