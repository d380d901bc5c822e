//! Headless data table with terminal rendering.
//!
//! A [`DataTable`] binds column definitions to rows and owns sorting,
//! filtering, pagination, selection and visibility state. Rows either live
//! entirely in memory (client mode) or arrive one page at a time from a remote
//! source (server mode), in which case state changes surface as
//! [`ServerQuery`] values for the caller to fetch.

mod column;
mod grid;
mod debounce;
mod facet;
mod pagination;
mod query;
mod search;
mod server;
mod state;
mod view_options;

use thiserror::Error;

pub use column::{CellValue, ColumnDef};
pub use grid::{BodyState, DataTable, ReportFn, RowIdFn, TableOptions};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use facet::{clear_facet, toggle_facet, FacetAction, FacetFilterPopup, FacetOption};
pub use pagination::{next_page_size, render_pagination, PageNav, PaginationInfo};
pub use query::{Namespace, ViewParams};
pub use search::{GlobalFilterMode, GlobalMatcher};
pub use server::ServerQuery;
pub use state::{
    page_count, ColumnFilterHandle, ColumnSort, FilterColumn, PaginationState, TableState,
    DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS,
};
pub use view_options::{ViewOptionsAction, ViewOptionsPopup};

/// Errors raised while configuring a table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// The view-state namespace is missing or malformed.
    #[error("Invalid table namespace: {0}")]
    InvalidNamespace(String),

    /// Two columns share an id.
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),
}
