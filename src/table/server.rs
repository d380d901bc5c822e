//! Translation of table state into remote list queries.

use serde_json::{json, Value};

use super::state::TableState;

/// A remote page request derived from table state.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerQuery {
    /// Filter triples in `[field, operator, value]` form.
    pub filters: Vec<Value>,
    /// `field asc|desc` clauses joined with commas, if any.
    pub order_by: Option<String>,
    /// Offset of the first row.
    pub limit_start: usize,
    /// Rows per page.
    pub limit_page_length: usize,
}

impl ServerQuery {
    /// Build a query for the current state.
    ///
    /// Each faceted column becomes an `in` filter. A non-empty search becomes
    /// a `like` filter on `search_field`.
    pub fn from_state(state: &TableState, search_field: Option<&str>) -> Self {
        let mut filters: Vec<Value> = state
            .column_filters
            .iter()
            .map(|(field, values)| json!([field, "in", values]))
            .collect();

        let search = state.global_filter.trim();
        if let (Some(field), false) = (search_field, search.is_empty()) {
            filters.push(json!([field, "like", format!("%{}%", search)]));
        }

        let order_by = if state.sorting.is_empty() {
            None
        } else {
            Some(
                state
                    .sorting
                    .iter()
                    .map(|s| format!("{} {}", s.id, if s.desc { "desc" } else { "asc" }))
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        };

        Self {
            filters,
            order_by,
            limit_start: state.pagination.offset(),
            limit_page_length: state.pagination.page_size,
        }
    }

    /// Filters encoded as the JSON text the list endpoint expects.
    pub fn filters_json(&self) -> String {
        Value::Array(self.filters.clone()).to_string()
    }
}
