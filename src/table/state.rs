//! Table state: pagination, sorting, filters, visibility and selection.

use std::collections::{BTreeMap, BTreeSet};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 20, 30, 40, 50];

/// Number of pages needed for `total` rows at `page_size` rows per page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Current page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Zero-based page index.
    pub page_index: usize,
    /// Rows per page; always greater than zero.
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    /// Create a pagination state, substituting the default for a zero size.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Number of pages for `total` rows.
    pub fn page_count(&self, total: usize) -> usize {
        page_count(total, self.page_size)
    }

    /// Clamp the page index into `[0, max(page_count - 1, 0)]`.
    ///
    /// Returns true if the index changed.
    pub fn clamp(&mut self, total: usize) -> bool {
        let last = self.page_count(total).saturating_sub(1);
        if self.page_index > last {
            self.page_index = last;
            true
        } else {
            false
        }
    }

    /// Change the page size. The page index always returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            return;
        }
        self.page_size = page_size;
        self.page_index = 0;
    }

    /// Offset of the first row on the current page, saturating at `usize::MAX`.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }
}

/// One entry in the ordered sort list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSort {
    /// Column id.
    pub id: String,
    /// Sort descending.
    pub desc: bool,
}

impl ColumnSort {
    /// Descending sort on a column.
    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }

    /// Ascending sort on a column.
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }
}

/// All mutable state of one table instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    /// Page position.
    pub pagination: PaginationState,
    /// Ordered sort list.
    pub sorting: Vec<ColumnSort>,
    /// Allowed values per faceted column. Never holds an empty list.
    pub column_filters: BTreeMap<String, Vec<String>>,
    /// Explicit visibility per column. Missing entries mean visible.
    pub column_visibility: BTreeMap<String, bool>,
    /// Selected row ids.
    pub row_selection: BTreeSet<String>,
    /// Committed free-text filter.
    pub global_filter: String,
}

impl TableState {
    /// Filter value of a column, if any.
    pub fn filter_value(&self, column_id: &str) -> Option<&[String]> {
        self.column_filters.get(column_id).map(Vec::as_slice)
    }

    /// Set or remove a column filter. An empty list removes the filter.
    pub fn set_filter_value(&mut self, column_id: &str, value: Option<Vec<String>>) {
        match value {
            Some(values) if !values.is_empty() => {
                self.column_filters.insert(column_id.to_string(), values);
            }
            _ => {
                self.column_filters.remove(column_id);
            }
        }
    }

    /// Whether a column is visible.
    pub fn is_visible(&self, column_id: &str) -> bool {
        self.column_visibility
            .get(column_id)
            .copied()
            .unwrap_or(true)
    }

    /// Flip the visibility of one column.
    pub fn toggle_visibility(&mut self, column_id: &str) {
        let visible = self.is_visible(column_id);
        self.column_visibility
            .insert(column_id.to_string(), !visible);
    }

    /// Whether a row is selected.
    pub fn is_selected(&self, row_id: &str) -> bool {
        self.row_selection.contains(row_id)
    }

    /// Flip the selection of one row.
    pub fn toggle_selected(&mut self, row_id: &str) {
        if !self.row_selection.remove(row_id) {
            self.row_selection.insert(row_id.to_string());
        }
    }

    /// Current sort direction of a column, if it is sorted.
    pub fn sort_of(&self, column_id: &str) -> Option<bool> {
        self.sorting
            .iter()
            .find(|s| s.id == column_id)
            .map(|s| s.desc)
    }

    /// Cycle a single-column sort: descending, ascending, then unsorted.
    pub fn cycle_sort(&mut self, column_id: &str) {
        let next = match self.sort_of(column_id) {
            None => Some(ColumnSort::desc(column_id)),
            Some(true) => Some(ColumnSort::asc(column_id)),
            Some(false) => None,
        };
        self.sorting = next.into_iter().collect();
    }
}

/// A handle on one column's filter value.
///
/// Filter controls talk to columns only through this trait, so they work the
/// same for local and server-bound tables.
pub trait FilterColumn {
    /// The column id.
    fn column_id(&self) -> &str;
    /// The current filter value, `None` when unconstrained.
    fn filter_value(&self) -> Option<&[String]>;
    /// Replace the filter value.
    fn set_filter_value(&mut self, value: Option<Vec<String>>);
}

/// Filter handle borrowing a column out of a [`TableState`].
pub struct ColumnFilterHandle<'a> {
    state: &'a mut TableState,
    column_id: String,
}

impl<'a> ColumnFilterHandle<'a> {
    /// Borrow the filter of `column_id`.
    pub fn new(state: &'a mut TableState, column_id: impl Into<String>) -> Self {
        Self {
            state,
            column_id: column_id.into(),
        }
    }
}

impl FilterColumn for ColumnFilterHandle<'_> {
    fn column_id(&self) -> &str {
        &self.column_id
    }

    fn filter_value(&self) -> Option<&[String]> {
        self.state.filter_value(&self.column_id)
    }

    fn set_filter_value(&mut self, value: Option<Vec<String>>) {
        self.state.set_filter_value(&self.column_id, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(23, 10), 3);
        assert_eq!(page_count(5, 0), 0);
        assert_eq!(page_count(usize::MAX, usize::MAX), 1);
        assert_eq!(page_count(usize::MAX, 10), usize::MAX / 10 + 1);
    }

    #[test]
    fn test_offset_saturates() {
        assert_eq!(PaginationState::new(3, 20).offset(), 60);
        assert_eq!(PaginationState::new(usize::MAX, 10).offset(), usize::MAX);
        assert_eq!(PaginationState::new(usize::MAX, usize::MAX).offset(), usize::MAX);
    }

    #[test]
    fn test_clamp_keeps_index_in_range() {
        for total in 0..60 {
            for size in 1..12 {
                let mut p = PaginationState::new(usize::MAX / 2, size);
                p.clamp(total);
                let count = page_count(total, size);
                assert!(p.page_index <= count.saturating_sub(1));
            }
        }
    }

    #[test]
    fn test_set_page_size_resets_index() {
        let mut p = PaginationState::new(4, 10);
        p.set_page_size(50);
        assert_eq!(p.page_index, 0);
        assert_eq!(p.page_size, 50);

        p.page_index = 2;
        p.set_page_size(0);
        assert_eq!(p.page_index, 2);
        assert_eq!(p.page_size, 50);
    }

    #[test]
    fn test_empty_filter_is_removed() {
        let mut state = TableState::default();
        state.set_filter_value("status", Some(vec!["Open".to_string()]));
        assert_eq!(state.filter_value("status"), Some(&["Open".to_string()][..]));

        state.set_filter_value("status", Some(vec![]));
        assert!(state.filter_value("status").is_none());
        assert!(state.column_filters.is_empty());
    }

    #[test]
    fn test_visibility_toggle_is_independent() {
        let mut state = TableState::default();
        state.toggle_visibility("vendor");
        assert!(!state.is_visible("vendor"));
        assert!(state.is_visible("project"));
        state.toggle_visibility("vendor");
        assert!(state.is_visible("vendor"));
    }

    #[test]
    fn test_cycle_sort() {
        let mut state = TableState::default();
        state.cycle_sort("creation");
        assert_eq!(state.sorting, vec![ColumnSort::desc("creation")]);
        state.cycle_sort("creation");
        assert_eq!(state.sorting, vec![ColumnSort::asc("creation")]);
        state.cycle_sort("creation");
        assert!(state.sorting.is_empty());

        state.cycle_sort("creation");
        state.cycle_sort("name");
        assert_eq!(state.sorting, vec![ColumnSort::desc("name")]);
    }

    #[test]
    fn test_filter_handle_reads_and_writes_state() {
        let mut state = TableState::default();
        {
            let mut handle = ColumnFilterHandle::new(&mut state, "status");
            assert_eq!(handle.column_id(), "status");
            assert!(handle.filter_value().is_none());
            handle.set_filter_value(Some(vec!["Draft".to_string()]));
        }
        assert_eq!(state.filter_value("status").map(|v| v.len()), Some(1));
    }
}
