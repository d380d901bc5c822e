//! Namespaced view-state query strings.
//!
//! A table's page index, page size and search term round-trip through a query
//! string such as `po_pageIdx=2&po_rows=20&po_search=steel`. Every key carries
//! the table's namespace so several tables can share one store.

use super::state::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use super::TableError;

/// Parameter suffix for the page index.
pub const PAGE_INDEX_KEY: &str = "pageIdx";
/// Parameter suffix for the page size.
pub const PAGE_SIZE_KEY: &str = "rows";
/// Parameter suffix for the search term.
pub const SEARCH_KEY: &str = "search";

/// The view state that survives a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    /// Zero-based page index.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Committed search term.
    pub search: String,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
        }
    }
}

/// Validated table namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace. It must be non-empty and contain only ASCII
    /// alphanumerics, `-` or `_`.
    pub fn new(ns: impl Into<String>) -> Result<Self, TableError> {
        let ns = ns.into();
        if ns.is_empty() {
            return Err(TableError::InvalidNamespace(
                "namespace cannot be empty".to_string(),
            ));
        }
        if !ns
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TableError::InvalidNamespace(format!(
                "namespace '{}' may only contain letters, digits, '-' and '_'",
                ns
            )));
        }
        Ok(Self(ns))
    }

    /// The namespace text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full key for a parameter suffix.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.0, suffix)
    }
}

impl ViewParams {
    /// Read this namespace's parameters out of a query string.
    ///
    /// Unknown keys, other namespaces and malformed numbers are ignored and
    /// fall back to defaults. A page size outside [`PAGE_SIZE_OPTIONS`] is
    /// treated as malformed.
    pub fn from_query(ns: &Namespace, query: &str) -> Self {
        let mut params = Self::default();
        let page_key = ns.key(PAGE_INDEX_KEY);
        let size_key = ns.key(PAGE_SIZE_KEY);
        let search_key = ns.key(SEARCH_KEY);

        for pair in query.trim_start_matches('?').split('&') {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(raw_key);
            let value = decode(raw_value);
            if key == page_key {
                if let Ok(n) = value.parse() {
                    params.page_index = n;
                }
            } else if key == size_key {
                match value.parse() {
                    Ok(n) if PAGE_SIZE_OPTIONS.contains(&n) => params.page_size = n,
                    _ => {}
                }
            } else if key == search_key {
                params.search = value;
            }
        }
        params
    }

    /// Write the parameters as a query string. An empty search is omitted.
    pub fn to_query(&self, ns: &Namespace) -> String {
        let mut parts = vec![
            format!("{}={}", ns.key(PAGE_INDEX_KEY), self.page_index),
            format!("{}={}", ns.key(PAGE_SIZE_KEY), self.page_size),
        ];
        if !self.search.is_empty() {
            parts.push(format!(
                "{}={}",
                ns.key(SEARCH_KEY),
                urlencoding::encode(&self.search)
            ));
        }
        parts.join("&")
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(s: &str) -> Namespace {
        Namespace::new(s).unwrap()
    }

    #[test]
    fn test_defaults_when_absent() {
        let params = ViewParams::from_query(&ns("po"), "");
        assert_eq!(params, ViewParams::default());
        assert_eq!(params.page_size, 10);
    }

    #[test]
    fn test_round_trip_with_special_characters() {
        let params = ViewParams {
            page_index: 3,
            page_size: 20,
            search: "steel & copper=50%".to_string(),
        };
        let q = params.to_query(&ns("po"));
        assert!(q.starts_with("po_pageIdx=3&po_rows=20&po_search="));
        assert_eq!(ViewParams::from_query(&ns("po"), &q), params);
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let q = "po_pageIdx=4&po_rows=30&sr_pageIdx=1&sr_search=pump";
        let po = ViewParams::from_query(&ns("po"), q);
        let sr = ViewParams::from_query(&ns("sr"), q);
        assert_eq!(po.page_index, 4);
        assert_eq!(po.page_size, 30);
        assert!(po.search.is_empty());
        assert_eq!(sr.page_index, 1);
        assert_eq!(sr.page_size, 10);
        assert_eq!(sr.search, "pump");
    }

    #[test]
    fn test_unnamespaced_keys_are_ignored() {
        let params = ViewParams::from_query(&ns("po"), "pageIdx=5&rows=50&search=x");
        assert_eq!(params, ViewParams::default());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let params = ViewParams::from_query(&ns("po"), "?po_pageIdx=abc&po_rows=0&po_search=a+b");
        assert_eq!(params.page_index, 0);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.search, "a b");
    }

    #[test]
    fn test_page_size_outside_selector_falls_back() {
        let q = "po_pageIdx=18446744073709551615&po_rows=18446744073709551615";
        let params = ViewParams::from_query(&ns("po"), q);
        assert_eq!(params.page_index, usize::MAX);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);

        for rows in ["5", "25", "99"] {
            let params = ViewParams::from_query(&ns("po"), &format!("po_rows={}", rows));
            assert_eq!(params.page_size, DEFAULT_PAGE_SIZE, "rows={}", rows);
        }
        let params = ViewParams::from_query(&ns("po"), "po_rows=50");
        assert_eq!(params.page_size, 50);
    }

    #[test]
    fn test_namespace_validation() {
        assert!(Namespace::new("").is_err());
        assert!(Namespace::new("po list").is_err());
        assert!(Namespace::new("po-list_2").is_ok());
    }
}
