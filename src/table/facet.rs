//! Faceted filters: a fixed set of discrete values per column.
//!
//! The toggle and clear operations work against any [`FilterColumn`] handle.
//! [`FacetFilterPopup`] is the checkbox popup that drives them from the
//! keyboard.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    widgets::Clear,
    Frame,
};
use tracing::{debug, warn};

use super::state::FilterColumn;
use crate::ui::components::{centered_rect, MultiSelect, SelectItem};

/// One selectable value of a faceted filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    /// Text shown to the user.
    pub label: String,
    /// Value stored in the column filter.
    pub value: String,
}

impl FacetOption {
    /// Create a facet option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Add `value` to the column's filter set, or remove it if already present.
///
/// An emptied set is written back as `None`. Returns true when the filter
/// changed; a missing column is logged and ignored.
pub fn toggle_facet(column: Option<&mut dyn FilterColumn>, value: &str) -> bool {
    let Some(column) = column else {
        warn!(value, "Facet toggle without a column");
        return false;
    };

    let mut values: Vec<String> = column.filter_value().map(<[String]>::to_vec).unwrap_or_default();
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
    } else {
        values.push(value.to_string());
    }

    debug!(column = column.column_id(), ?values, "Facet toggled");
    column.set_filter_value(if values.is_empty() { None } else { Some(values) });
    true
}

/// Reset the column's filter to unconstrained.
pub fn clear_facet(column: Option<&mut dyn FilterColumn>) -> bool {
    let Some(column) = column else {
        warn!("Facet clear without a column");
        return false;
    };
    column.set_filter_value(None);
    true
}

/// Actions returned from the facet popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetAction {
    /// Toggle one value.
    Toggle(String),
    /// Clear the whole filter.
    Clear,
    /// Close the popup.
    Close,
}

/// Checkbox popup for one faceted column.
pub struct FacetFilterPopup {
    column_id: String,
    select: MultiSelect,
}

impl FacetFilterPopup {
    /// Open a popup for `column_id` with its options and current selection.
    pub fn new(
        column_id: impl Into<String>,
        title: impl Into<String>,
        options: &[FacetOption],
        selected: Option<&[String]>,
    ) -> Self {
        let mut select = MultiSelect::new(title);
        select.set_items(
            options
                .iter()
                .map(|o| SelectItem::new(o.value.clone(), o.label.clone()))
                .collect(),
        );
        let mut popup = Self {
            column_id: column_id.into(),
            select,
        };
        popup.sync(selected);
        popup
    }

    /// The column this popup filters.
    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    /// Reflect the column's current filter value in the checkboxes.
    pub fn sync(&mut self, selected: Option<&[String]>) {
        let set: HashSet<String> = selected.unwrap_or_default().iter().cloned().collect();
        self.select.set_selected(set);
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<FacetAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Enter, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                Some(FacetAction::Close)
            }
            (KeyCode::Char(' '), KeyModifiers::NONE) => self
                .select
                .current_item()
                .map(|item| FacetAction::Toggle(item.id.clone())),
            (KeyCode::Char('c'), KeyModifiers::NONE) => Some(FacetAction::Clear),
            _ => {
                self.select.handle_navigation(key);
                None
            }
        }
    }

    /// Render the popup centered over `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = (self.select.len() as u16 + 2).clamp(3, area.height.max(3));
        let popup = centered_rect(40, height, area);
        frame.render_widget(Clear, popup);
        self.select.render(frame, popup, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::state::{ColumnFilterHandle, TableState};

    fn toggle(state: &mut TableState, value: &str) {
        let mut handle = ColumnFilterHandle::new(state, "category");
        toggle_facet(Some(&mut handle), value);
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut state = TableState::default();
        toggle(&mut state, "elec");
        assert_eq!(state.filter_value("category"), Some(&["elec".to_string()][..]));
        toggle(&mut state, "elec");
        assert!(state.filter_value("category").is_none());
    }

    #[test]
    fn test_toggle_twice_restores_prior_state() {
        let mut state = TableState::default();
        toggle(&mut state, "civil");
        let before = state.clone();

        toggle(&mut state, "elec");
        toggle(&mut state, "elec");
        assert_eq!(state, before);
    }

    #[test]
    fn test_select_select_deselect_leaves_remaining_value() {
        let mut state = TableState::default();
        toggle(&mut state, "elec");
        toggle(&mut state, "civil");
        toggle(&mut state, "elec");
        assert_eq!(
            state.filter_value("category"),
            Some(&["civil".to_string()][..])
        );
    }

    #[test]
    fn test_clear_resets_to_none() {
        let mut state = TableState::default();
        toggle(&mut state, "elec");
        toggle(&mut state, "civil");
        let mut handle = ColumnFilterHandle::new(&mut state, "category");
        assert!(clear_facet(Some(&mut handle)));
        assert!(state.filter_value("category").is_none());
    }

    #[test]
    fn test_missing_column_is_a_no_op() {
        assert!(!toggle_facet(None, "elec"));
        assert!(!clear_facet(None));
    }

    #[test]
    fn test_popup_toggle_action_uses_option_value() {
        let options = vec![
            FacetOption::new("Electrical", "elec"),
            FacetOption::new("Civil", "civil"),
        ];
        let mut popup = FacetFilterPopup::new("category", "Category", &options, None);

        let action = popup.handle_input(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert!(action.is_none());
        let action = popup.handle_input(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(action, Some(FacetAction::Toggle("civil".to_string())));

        let action = popup.handle_input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        assert_eq!(action, Some(FacetAction::Clear));
        let action = popup.handle_input(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(action, Some(FacetAction::Close));
    }
}
