//! Frappe REST request and response types.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::table::ServerQuery;

/// A document as returned by the list endpoint: field name to JSON value.
pub type Record = Map<String, Value>;

/// Body of `GET /api/resource/<doctype>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub data: Vec<Record>,
}

/// Body of `GET /api/method/...` calls that return a single value.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodResponse<T> {
    pub message: T,
}

/// A list request for one doctype.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub doctype: String,
    pub fields: Vec<String>,
    /// JSON-encoded filter triples.
    pub filters: String,
    pub order_by: Option<String>,
    pub limit_start: usize,
    /// Zero asks the site for every row.
    pub limit_page_length: usize,
}

impl ListQuery {
    /// Every row of `doctype` with `fields`, unfiltered.
    pub fn new(doctype: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            doctype: doctype.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            filters: "[]".to_string(),
            order_by: None,
            limit_start: 0,
            limit_page_length: 0,
        }
    }

    /// One table page.
    pub fn from_server(doctype: impl Into<String>, fields: &[&str], query: &ServerQuery) -> Self {
        Self {
            filters: query.filters_json(),
            order_by: query.order_by.clone(),
            limit_start: query.limit_start,
            limit_page_length: query.limit_page_length,
            ..Self::new(doctype, fields)
        }
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = filters.into();
        self
    }

    pub fn page(mut self, limit_start: usize, limit_page_length: usize) -> Self {
        self.limit_start = limit_start;
        self.limit_page_length = limit_page_length;
        self
    }

    /// Path and query string relative to the site root.
    pub fn to_path(&self) -> String {
        let fields = Value::Array(self.fields.iter().cloned().map(Value::String).collect());
        let mut path = format!(
            "/api/resource/{}?fields={}&filters={}&limit_start={}&limit_page_length={}",
            urlencoding::encode(&self.doctype),
            urlencoding::encode(&fields.to_string()),
            urlencoding::encode(&self.filters),
            self.limit_start,
            self.limit_page_length
        );
        if let Some(order_by) = &self.order_by {
            path.push_str("&order_by=");
            path.push_str(&urlencoding::encode(order_by));
        }
        path
    }
}

/// Path of the count method for a doctype and filters.
pub fn count_path(doctype: &str, filters: &str) -> String {
    format!(
        "/api/method/frappe.client.get_count?doctype={}&filters={}",
        urlencoding::encode(doctype),
        urlencoding::encode(filters)
    )
}

/// Read a string field, treating missing and null as empty.
pub fn field_str<'a>(record: &'a Record, field: &str) -> &'a str {
    record.get(field).and_then(Value::as_str).unwrap_or("")
}
