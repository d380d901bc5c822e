//! The table core: row model derivation, interaction state and rendering.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState as RenderState},
    Frame,
};
use tracing::{debug, error, info, warn};

use super::column::ColumnDef;
use super::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use super::facet::{self, FacetOption};
use super::pagination::{self, PageNav, PaginationInfo};
use super::query::{Namespace, ViewParams};
use super::search::{GlobalFilterMode, GlobalMatcher, Haystack};
use super::server::ServerQuery;
use super::state::{ColumnFilterHandle, ColumnSort, PaginationState, TableState};
use super::TableError;
use crate::export::{CsvExporter, ExportOutcome};
use crate::ui::theme::theme;

/// Column id that drives the default sort.
const CREATION_COLUMN: &str = "creation";

/// Produces the rows for one report type out of all supplied rows.
pub type ReportFn<R> = Arc<dyn Fn(&[R], &str) -> Vec<R> + Send + Sync>;

/// Produces a stable identifier for a row. Receives the row's load index.
pub type RowIdFn<R> = Arc<dyn Fn(&R, usize) -> String + Send + Sync>;

/// Recognized table options.
pub struct TableOptions<R> {
    /// Global filter mode. Fuzzy unless an item-search haystack is given.
    pub global_filter: GlobalFilterMode<R>,
    /// Initial sort column, sorted descending.
    pub sort_column: Option<String>,
    /// File name prefix for report exports.
    pub export_file_name_prefix: Option<String>,
    /// Row source for report exports.
    pub get_export_data: Option<ReportFn<R>>,
    /// Facet options keyed by column id.
    pub facet_filter_options: BTreeMap<String, Vec<FacetOption>>,
    /// Enable selection-based export.
    pub show_export_button: bool,
    /// Row identity. Defaults to the load index.
    pub row_id: Option<RowIdFn<R>>,
    /// Quiet period for search and view-state commits.
    pub debounce: Duration,
    /// Remote field matched by the search term in server mode.
    pub search_field: Option<String>,
}

impl<R> Default for TableOptions<R> {
    fn default() -> Self {
        Self {
            global_filter: GlobalFilterMode::Fuzzy,
            sort_column: None,
            export_file_name_prefix: None,
            get_export_data: None,
            facet_filter_options: BTreeMap::new(),
            show_export_button: false,
            row_id: None,
            debounce: DEFAULT_DEBOUNCE,
            search_field: None,
        }
    }
}

impl<R> TableOptions<R> {
    /// Use a domain haystack for the global filter.
    pub fn item_search<F>(mut self, haystack: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        let haystack: Haystack<R> = Arc::new(haystack);
        self.global_filter = GlobalFilterMode::ItemSearch(haystack);
        self
    }

    pub fn sort_column(mut self, column: impl Into<String>) -> Self {
        self.sort_column = Some(column.into());
        self
    }

    /// Enable report exports.
    pub fn report_export<F>(mut self, prefix: impl Into<String>, get_rows: F) -> Self
    where
        F: Fn(&[R], &str) -> Vec<R> + Send + Sync + 'static,
    {
        self.export_file_name_prefix = Some(prefix.into());
        self.get_export_data = Some(Arc::new(get_rows));
        self
    }

    pub fn facet(mut self, column: impl Into<String>, options: Vec<FacetOption>) -> Self {
        self.facet_filter_options.insert(column.into(), options);
        self
    }

    pub fn export_button(mut self) -> Self {
        self.show_export_button = true;
        self
    }

    pub fn row_id<F>(mut self, f: F) -> Self
    where
        F: Fn(&R, usize) -> String + Send + Sync + 'static,
    {
        self.row_id = Some(Arc::new(f));
        self
    }

    pub fn debounce(mut self, quiet: Duration) -> Self {
        self.debounce = quiet;
        self
    }

    pub fn search_field(mut self, field: impl Into<String>) -> Self {
        self.search_field = Some(field.into());
        self
    }
}

/// What the table body currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// A single loading row.
    Loading,
    /// A single "No results." row.
    Empty,
    /// This many data rows.
    Rows(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataMode {
    Client,
    Server { total_count: usize },
}

/// Rows for the current page plus the filtered total.
struct RowModel {
    page: Vec<usize>,
    total: usize,
}

/// A data table bound to a column list and a row collection.
pub struct DataTable<R> {
    namespace: Namespace,
    columns: Vec<ColumnDef<R>>,
    options: TableOptions<R>,
    rows: Vec<R>,
    mode: DataMode,
    state: TableState,
    loading: bool,
    error: Option<String>,
    search_input: String,
    search_debounce: Debouncer<String>,
    view_debounce: Debouncer<ViewParams>,
    last_view: ViewParams,
    view_update: Option<String>,
    query_pending: bool,
    query_seq: u64,
    cursor: usize,
    focused_column: usize,
    render_state: RenderState,
}

impl<R> DataTable<R> {
    /// Create a table. The namespace prefixes every view-state key.
    pub fn new(
        namespace: &str,
        columns: Vec<ColumnDef<R>>,
        options: TableOptions<R>,
    ) -> Result<Self, TableError> {
        let namespace = Namespace::new(namespace)?;

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(TableError::DuplicateColumn(column.id.clone()));
            }
        }

        let mut state = TableState::default();
        for column in columns.iter().filter(|c| c.hidden_by_default) {
            state.column_visibility.insert(column.id.clone(), false);
        }
        state.sorting = default_sort(&columns, options.sort_column.as_deref());

        let debounce = options.debounce;
        debug!(namespace = namespace.as_str(), columns = columns.len(), "Table created");

        Ok(Self {
            namespace,
            columns,
            options,
            rows: Vec::new(),
            mode: DataMode::Client,
            state,
            loading: false,
            error: None,
            search_input: String::new(),
            search_debounce: Debouncer::new(debounce),
            view_debounce: Debouncer::new(debounce),
            last_view: ViewParams::default(),
            view_update: None,
            query_pending: false,
            query_seq: 0,
            cursor: 0,
            focused_column: 0,
            render_state: RenderState::default(),
        })
    }

    /// Switch to server mode: rows are one remote page at a time.
    pub fn server_mode(mut self) -> Self {
        self.mode = DataMode::Server { total_count: 0 };
        self.query_pending = true;
        self
    }

    /// Whether rows come from a remote source page by page.
    pub fn is_server_mode(&self) -> bool {
        matches!(self.mode, DataMode::Server { .. })
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    pub fn columns(&self) -> &[ColumnDef<R>] {
        &self.columns
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn options(&self) -> &TableOptions<R> {
        &self.options
    }

    /// All loaded rows, in load order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The search text as typed, before the debounce commits it.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    // ------------------------------------------------------------------
    // View state
    // ------------------------------------------------------------------

    /// Restore page and search from a stored query string.
    pub fn restore_view(&mut self, query: &str) {
        let params = ViewParams::from_query(&self.namespace, query);
        debug!(namespace = self.namespace.as_str(), ?params, "Restoring view state");
        let mut pagination = PaginationState::new(params.page_index, params.page_size);
        pagination.page_index = pagination.page_index.min(usize::MAX / pagination.page_size);
        self.state.pagination = pagination;
        self.state.global_filter = params.search.clone();
        self.search_input = params.search.clone();
        // Without loaded rows the total is unknown; the first page or
        // `set_rows` clamps instead.
        if !self.rows.is_empty() {
            let total = self.row_model().total;
            self.state.pagination.clamp(total);
        }
        self.last_view = self.view_params();
        self.query_pending = self.is_server_mode();
    }

    /// Current view parameters.
    pub fn view_params(&self) -> ViewParams {
        ViewParams {
            page_index: self.state.pagination.page_index,
            page_size: self.state.pagination.page_size,
            search: self.state.global_filter.clone(),
        }
    }

    /// Take the last committed view-state query string, if it changed.
    pub fn take_view_update(&mut self) -> Option<String> {
        self.view_update.take()
    }

    /// Commit any pending view state immediately.
    pub fn flush_view(&mut self) {
        if let Some(params) = self.view_debounce.flush() {
            self.view_update = Some(params.to_query(&self.namespace));
        }
    }

    fn touch(&mut self) {
        let params = self.view_params();
        if params != self.last_view {
            self.last_view = params.clone();
            self.view_debounce.push(params, Instant::now());
        }
        if self.is_server_mode() {
            self.query_pending = true;
        }
    }

    /// Advance debounced work. Returns true when the committed filter changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut committed = false;
        if let Some(search) = self.search_debounce.poll(now) {
            if search != self.state.global_filter {
                debug!(namespace = self.namespace.as_str(), search = %search, "Search committed");
                self.state.global_filter = search;
                self.state.pagination.page_index = 0;
                self.cursor = 0;
                self.touch();
                committed = true;
            }
        }
        if let Some(params) = self.view_debounce.poll(now) {
            self.view_update = Some(params.to_query(&self.namespace));
        }
        committed
    }

    // ------------------------------------------------------------------
    // Search input
    // ------------------------------------------------------------------

    /// Replace the typed search text. The filter itself commits later.
    pub fn set_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search_input = text.into();
        self.search_debounce.push(self.search_input.clone(), now);
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        let mut text = self.search_input.clone();
        text.push(c);
        self.set_search_input(text, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut text = self.search_input.clone();
        if text.pop().is_some() {
            self.set_search_input(text, now);
        }
    }

    // ------------------------------------------------------------------
    // Remote data
    // ------------------------------------------------------------------

    /// Take the query for the next remote fetch, if state changed since the
    /// last one. Returns the sequence number to hand back with the result.
    pub fn take_query(&mut self) -> Option<(u64, ServerQuery)> {
        if !self.is_server_mode() || !self.query_pending {
            return None;
        }
        self.query_pending = false;
        self.query_seq += 1;
        self.loading = true;
        let query = ServerQuery::from_state(&self.state, self.options.search_field.as_deref());
        debug!(namespace = self.namespace.as_str(), seq = self.query_seq, ?query, "Query issued");
        Some((self.query_seq, query))
    }

    /// Force a refetch on the next [`take_query`](Self::take_query).
    pub fn refresh(&mut self) {
        if self.is_server_mode() {
            self.query_pending = true;
        }
    }

    /// Apply a fetched page. Results for superseded queries are dropped.
    pub fn apply_server_page(&mut self, seq: u64, rows: Vec<R>, total_count: usize) -> bool {
        if seq != self.query_seq {
            debug!(seq, latest = self.query_seq, "Dropping stale page");
            return false;
        }
        self.mode = DataMode::Server { total_count };
        self.rows = rows;
        self.loading = false;
        self.error = None;
        self.retain_loaded_selection();
        if self.state.pagination.clamp(total_count) {
            info!(
                page_index = self.state.pagination.page_index,
                "Page index clamped after total changed"
            );
            self.touch();
        }
        self.clamp_cursor();
        true
    }

    /// Record a failed fetch. Stale failures are dropped.
    pub fn apply_server_error(&mut self, seq: u64, message: impl Into<String>) -> bool {
        if seq != self.query_seq {
            return false;
        }
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    // ------------------------------------------------------------------
    // Local data
    // ------------------------------------------------------------------

    /// Replace all rows (client mode).
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.loading = false;
        self.error = None;
        self.retain_loaded_selection();
        let total = self.row_model().total;
        if self.state.pagination.clamp(total) {
            self.touch();
        }
        self.clamp_cursor();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.loading = false;
        self.error = error;
    }

    fn row_id_at(&self, index: usize) -> String {
        match &self.options.row_id {
            Some(f) => f(&self.rows[index], index),
            None => index.to_string(),
        }
    }

    fn retain_loaded_selection(&mut self) {
        let loaded: HashSet<String> = (0..self.rows.len()).map(|i| self.row_id_at(i)).collect();
        self.state.row_selection.retain(|id| loaded.contains(id));
    }

    // ------------------------------------------------------------------
    // Row model
    // ------------------------------------------------------------------

    fn visible_columns(&self) -> Vec<&ColumnDef<R>> {
        self.columns
            .iter()
            .filter(|c| self.state.is_visible(&c.id))
            .collect()
    }

    fn column(&self, id: &str) -> Option<&ColumnDef<R>> {
        self.columns.iter().find(|c| c.id == id)
    }

    fn row_model(&self) -> RowModel {
        if let DataMode::Server { total_count } = self.mode {
            return RowModel {
                page: (0..self.rows.len()).collect(),
                total: total_count,
            };
        }

        let ordered = self.ordered_indices();
        let total = ordered.len();
        let p = &self.state.pagination;
        let page = ordered
            .into_iter()
            .skip(p.offset())
            .take(p.page_size)
            .collect();
        RowModel { page, total }
    }

    /// Indices of rows passing facets and search, in display order.
    fn ordered_indices(&self) -> Vec<usize> {
        let facet_filters: Vec<(&ColumnDef<R>, &Vec<String>)> = self
            .state
            .column_filters
            .iter()
            .filter_map(|(id, values)| self.column(id).map(|c| (c, values)))
            .collect();
        let searchable: Vec<&ColumnDef<R>> = self
            .visible_columns()
            .into_iter()
            .filter(|c| c.enable_filtering)
            .collect();
        let matcher = GlobalMatcher::new(&self.options.global_filter, &self.state.global_filter);

        let mut scored: Vec<(usize, i64)> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                facet_filters
                    .iter()
                    .all(|(col, values)| values.contains(&col.display(row)))
            })
            .filter_map(|(i, row)| {
                matcher
                    .score(row, searchable.iter().map(|c| c.display(row)))
                    .map(|score| (i, score))
            })
            .collect();

        if !self.state.sorting.is_empty() {
            let sorts: Vec<(&ColumnDef<R>, bool)> = self
                .state
                .sorting
                .iter()
                .filter_map(|s| self.column(&s.id).map(|c| (c, s.desc)))
                .collect();
            scored.sort_by(|(a, _), (b, _)| {
                for (col, desc) in &sorts {
                    let ord = col.value(&self.rows[*a]).compare(&col.value(&self.rows[*b]));
                    let ord = if *desc { ord.reverse() } else { ord };
                    if ord.is_ne() {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        } else if !matcher.is_empty() {
            scored.sort_by(|(_, a), (_, b)| b.cmp(a));
        }
        scored.into_iter().map(|(i, _)| i).collect()
    }

    /// Rows on the current page, in display order.
    pub fn page_rows(&self) -> Vec<&R> {
        self.row_model().page.into_iter().map(|i| &self.rows[i]).collect()
    }

    /// Every row matching the current filters, in display order. In server
    /// mode this is the loaded page.
    pub fn filtered_rows(&self) -> Vec<&R> {
        match self.mode {
            DataMode::Server { .. } => self.rows.iter().collect(),
            _ => self.ordered_indices().into_iter().map(|i| &self.rows[i]).collect(),
        }
    }

    /// Number of rows matching the current filters.
    pub fn filtered_count(&self) -> usize {
        self.row_model().total
    }

    /// What the body shows. Loading wins over empty.
    pub fn body_state(&self) -> BodyState {
        if self.loading {
            return BodyState::Loading;
        }
        match self.row_model().page.len() {
            0 => BodyState::Empty,
            n => BodyState::Rows(n),
        }
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    pub fn pagination_info(&self) -> PaginationInfo {
        PaginationInfo::new(&self.state.pagination, self.row_model().total, self.loading)
    }

    /// Navigate pages. Disabled navigation is a no-op.
    pub fn navigate(&mut self, nav: PageNav) -> bool {
        let info = self.pagination_info();
        let changed = pagination::navigate(&mut self.state.pagination, &info, nav);
        if changed {
            self.cursor = 0;
            self.touch();
        }
        changed
    }

    /// Change the page size; the page index resets to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 || page_size == self.state.pagination.page_size {
            return;
        }
        self.state.pagination.set_page_size(page_size);
        self.cursor = 0;
        self.touch();
    }

    pub fn cycle_page_size(&mut self) {
        self.set_page_size(pagination::next_page_size(self.state.pagination.page_size));
    }

    // ------------------------------------------------------------------
    // Filters, sorting, visibility
    // ------------------------------------------------------------------

    /// Faceted column ids in column order.
    pub fn facet_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| self.options.facet_filter_options.contains_key(&c.id))
            .map(|c| c.id.as_str())
            .collect()
    }

    pub fn facet_options(&self, column_id: &str) -> &[FacetOption] {
        self.options
            .facet_filter_options
            .get(column_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Filter handle for a known column.
    pub fn filter_handle(&mut self, column_id: &str) -> Option<ColumnFilterHandle<'_>> {
        if self.column(column_id).is_none() {
            return None;
        }
        Some(ColumnFilterHandle::new(&mut self.state, column_id))
    }

    fn after_filter_change(&mut self) {
        self.state.pagination.page_index = 0;
        self.cursor = 0;
        self.touch();
    }

    /// Toggle one facet value on a column.
    pub fn toggle_facet(&mut self, column_id: &str, value: &str) -> bool {
        let changed = match self.filter_handle(column_id) {
            Some(mut handle) => facet::toggle_facet(Some(&mut handle), value),
            None => facet::toggle_facet(None, value),
        };
        if changed {
            self.after_filter_change();
        }
        changed
    }

    /// Clear a column's facet filter.
    pub fn clear_facet(&mut self, column_id: &str) -> bool {
        let changed = match self.filter_handle(column_id) {
            Some(mut handle) => facet::clear_facet(Some(&mut handle)),
            None => facet::clear_facet(None),
        };
        if changed {
            self.after_filter_change();
        }
        changed
    }

    /// Flip a column's visibility.
    pub fn toggle_visibility(&mut self, column_id: &str) {
        if self.column(column_id).is_none() {
            warn!(column_id, "Visibility toggle for unknown column");
            return;
        }
        self.state.toggle_visibility(column_id);
        let visible = self.visible_columns().len();
        self.focused_column = self.focused_column.min(visible.saturating_sub(1));
    }

    /// Cycle the sort of the focused column.
    pub fn cycle_sort_focused(&mut self) {
        let Some(column) = self.visible_columns().get(self.focused_column).copied() else {
            return;
        };
        if !column.enable_sorting {
            return;
        }
        let id = column.id.clone();
        self.state.cycle_sort(&id);
        self.cursor = 0;
        self.touch();
    }

    // ------------------------------------------------------------------
    // Cursor and selection
    // ------------------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn clamp_cursor(&mut self) {
        let len = self.row_model().page.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        let len = self.row_model().page.len();
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn focus_next_column(&mut self) {
        let count = self.visible_columns().len();
        if self.focused_column + 1 < count {
            self.focused_column += 1;
        }
    }

    pub fn focus_prev_column(&mut self) {
        self.focused_column = self.focused_column.saturating_sub(1);
    }

    /// Id of the focused visible column.
    pub fn focused_column_id(&self) -> Option<&str> {
        self.visible_columns()
            .get(self.focused_column)
            .copied()
            .map(|c| c.id.as_str())
    }

    /// Toggle selection of the row under the cursor.
    pub fn toggle_cursor_selection(&mut self) {
        if let Some(&index) = self.row_model().page.get(self.cursor) {
            let id = self.row_id_at(index);
            self.state.toggle_selected(&id);
        }
    }

    /// Select every row on the page, or clear them if all are selected.
    pub fn toggle_page_selection(&mut self) {
        let ids: Vec<String> = self
            .row_model()
            .page
            .into_iter()
            .map(|i| self.row_id_at(i))
            .collect();
        let all_selected = !ids.is_empty() && ids.iter().all(|id| self.state.is_selected(id));
        for id in ids {
            if all_selected {
                self.state.row_selection.remove(&id);
            } else {
                self.state.row_selection.insert(id);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.row_selection.clear();
    }

    /// Selected rows, in load order.
    pub fn selected_rows(&self) -> Vec<&R> {
        (0..self.rows.len())
            .filter(|&i| self.state.is_selected(&self.row_id_at(i)))
            .map(|i| &self.rows[i])
            .collect()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Whether selection export is available right now.
    pub fn can_export(&self) -> bool {
        self.options.show_export_button && !self.loading && !self.rows.is_empty()
    }

    /// Export exactly the selected rows.
    pub fn export_selected(&self, exporter: &CsvExporter) -> ExportOutcome {
        if !self.options.show_export_button {
            return ExportOutcome::Skipped("Export is not enabled for this table".to_string());
        }
        if self.loading {
            return ExportOutcome::Skipped("Wait for the data to finish loading".to_string());
        }
        if self.rows.is_empty() {
            return ExportOutcome::Skipped("No data to export".to_string());
        }
        let selected = self.selected_rows();
        if selected.is_empty() {
            return ExportOutcome::Skipped("No rows selected".to_string());
        }

        let name = format!(
            "{}_selected",
            self.options
                .export_file_name_prefix
                .as_deref()
                .unwrap_or(self.namespace.as_str())
        );
        match exporter.export(&name, selected.iter().copied(), &self.columns) {
            Ok(path) => {
                info!(path = %path.display(), rows = selected.len(), "Selection exported");
                ExportOutcome::Exported {
                    path,
                    rows: selected.len(),
                }
            }
            Err(e) => {
                error!(error = %e, "Selection export failed");
                ExportOutcome::Failed(e.to_string())
            }
        }
    }

    /// Export all supplied rows through the report function for `report_type`.
    pub fn export_report(&self, exporter: &CsvExporter, report_type: &str) -> ExportOutcome {
        let (Some(prefix), Some(get_rows)) = (
            self.options.export_file_name_prefix.as_deref(),
            self.options.get_export_data.as_ref(),
        ) else {
            error!(
                namespace = self.namespace.as_str(),
                "Report export requested without a file prefix or row source"
            );
            return ExportOutcome::Failed("Export is not configured for this table".to_string());
        };

        let rows = get_rows(&self.rows, report_type);
        if rows.is_empty() {
            info!(report_type, "Nothing to export");
            return ExportOutcome::Skipped(format!("No data to export for '{}'", report_type));
        }

        let name = format!("{}_{}", prefix, report_type);
        match exporter.export(&name, rows.iter(), &self.columns) {
            Ok(path) => {
                info!(path = %path.display(), rows = rows.len(), report_type, "Report exported");
                ExportOutcome::Exported {
                    path,
                    rows: rows.len(),
                }
            }
            Err(e) => {
                error!(error = %e, report_type, "Report export failed");
                ExportOutcome::Failed(e.to_string())
            }
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn header_cell(&self, column: &ColumnDef<R>, focused: bool) -> Cell<'static> {
        let t = theme();
        let mut spans = vec![Span::styled(
            column.header.clone(),
            Style::default().fg(t.header).add_modifier(Modifier::BOLD),
        )];
        match self.state.sort_of(&column.id) {
            Some(true) => spans.push(Span::raw(" ↓")),
            Some(false) => spans.push(Span::raw(" ↑")),
            None => {}
        }
        if self.options.facet_filter_options.contains_key(&column.id) {
            let marker = match self.state.filter_value(&column.id) {
                Some(values) => format!(" ⊕{}", values.len()),
                None => " ⊕".to_string(),
            };
            spans.push(Span::styled(marker, Style::default().fg(t.accent)));
        }
        let style = if focused {
            Style::default().add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        Cell::from(Line::from(spans)).style(style)
    }

    /// Render search line, table body and pagination footer.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let t = theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let search = if self.search_input.is_empty() {
            Line::from(Span::styled("/ to search", Style::default().fg(t.muted)))
        } else {
            Line::from(vec![
                Span::styled("/", Style::default().fg(t.warning)),
                Span::raw(self.search_input.clone()),
            ])
        };
        frame.render_widget(Paragraph::new(search), chunks[0]);

        let visible = self.visible_columns();
        let selectable = self.options.show_export_button;

        let mut widths: Vec<Constraint> = Vec::new();
        let mut header_cells: Vec<Cell> = Vec::new();
        if selectable {
            widths.push(Constraint::Length(3));
            header_cells.push(Cell::from(""));
        }
        for (i, column) in visible.iter().enumerate() {
            widths.push(match column.width {
                Some(w) => Constraint::Length(w),
                None => Constraint::Fill(1),
            });
            header_cells.push(self.header_cell(column, focused && i == self.focused_column));
        }

        let body = self.body_state();
        let model = self.row_model();
        let rows: Vec<Row> = match body {
            BodyState::Rows(_) => model
                .page
                .iter()
                .map(|&i| {
                    let row = &self.rows[i];
                    let mut cells: Vec<Cell> = Vec::new();
                    if selectable {
                        let mark = if self.state.is_selected(&self.row_id_at(i)) {
                            "[x]"
                        } else {
                            "[ ]"
                        };
                        cells.push(Cell::from(mark));
                    }
                    cells.extend(visible.iter().map(|c| Cell::from(c.display(row))));
                    Row::new(cells)
                })
                .collect(),
            _ => Vec::new(),
        };

        let border = if focused { t.border_focused } else { t.border };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(chunks[1]);

        let table = Table::new(rows, widths)
            .header(Row::new(header_cells))
            .block(block)
            .highlight_style(Style::default().bg(t.selection).add_modifier(Modifier::BOLD));

        let selected = matches!(body, BodyState::Rows(_)).then_some(self.cursor);
        self.render_state.select(selected);
        frame.render_stateful_widget(table, chunks[1], &mut self.render_state);

        let message = match body {
            BodyState::Loading => Some("Loading…"),
            BodyState::Empty => Some("No results."),
            BodyState::Rows(_) => None,
        };
        if let Some(message) = message {
            if inner.height > 1 {
                let line_area = Rect::new(inner.x, inner.y + 1, inner.width, 1);
                frame.render_widget(
                    Paragraph::new(message)
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(t.muted)),
                    line_area,
                );
            }
        }

        pagination::render_pagination(
            frame,
            chunks[2],
            &self.pagination_info(),
            self.state.row_selection.len(),
        );
    }
}

/// `creation` descending when that column exists and no other column was
/// asked for; otherwise the requested column, descending.
fn default_sort<R>(columns: &[ColumnDef<R>], sort_column: Option<&str>) -> Vec<ColumnSort> {
    let has_creation = columns.iter().any(|c| c.id == CREATION_COLUMN);
    match sort_column {
        None | Some(CREATION_COLUMN) if has_creation => vec![ColumnSort::desc(CREATION_COLUMN)],
        Some(column) => vec![ColumnSort::desc(column)],
        None => Vec::new(),
    }
}
