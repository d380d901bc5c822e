//! Column definitions and cell values.
//!
//! A column describes how to read one cell out of an opaque row, how wide it
//! renders, whether it can be sorted, filtered or hidden, and how it appears in
//! CSV exports.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Reads a cell value out of a row.
pub type Accessor<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// A single cell value produced by a column accessor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value.
    #[default]
    Empty,
    /// Free text.
    Text(String),
    /// Whole number.
    Int(i64),
    /// Decimal number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
}

impl CellValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Check if this cell has no value.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Compare two cells for sorting.
    ///
    /// Numbers compare numerically, text compares case-insensitively, and
    /// empty cells sort before everything else.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Empty, Empty) => Ordering::Equal,
            (Empty, _) => Ordering::Less,
            (_, Empty) => Ordering::Greater,
            (Int(a), Int(b)) => a.cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Bool(a), Bool(b)) => a.cmp(b),
            (a, b) => a
                .to_string()
                .to_lowercase()
                .cmp(&b.to_string().to_lowercase()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(n) => write!(f, "{}", n),
            CellValue::Float(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Export metadata attached to a column.
pub struct ExportMeta<R> {
    /// Header name used in exports instead of the display header.
    pub header_name: Option<String>,
    /// Value used in exports instead of the accessor value.
    pub value: Option<Accessor<R>>,
    /// Leave this column out of exports entirely.
    pub exclude: bool,
}

impl<R> Default for ExportMeta<R> {
    fn default() -> Self {
        Self {
            header_name: None,
            value: None,
            exclude: false,
        }
    }
}

impl<R> Clone for ExportMeta<R> {
    fn clone(&self) -> Self {
        Self {
            header_name: self.header_name.clone(),
            value: self.value.clone(),
            exclude: self.exclude,
        }
    }
}

/// Declarative description of one table column.
pub struct ColumnDef<R> {
    /// Unique column identifier; also the accessor key.
    pub id: String,
    /// Display header. May be empty for selection-style columns.
    pub header: String,
    accessor: Accessor<R>,
    /// Fixed width in terminal cells.
    pub width: Option<u16>,
    /// Whether the column can be sorted.
    pub enable_sorting: bool,
    /// Whether the column takes part in filtering.
    pub enable_filtering: bool,
    /// Whether the user can toggle this column's visibility.
    pub can_hide: bool,
    /// Whether the column starts hidden.
    pub hidden_by_default: bool,
    /// CSV export metadata.
    pub export: ExportMeta<R>,
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            width: self.width,
            enable_sorting: self.enable_sorting,
            enable_filtering: self.enable_filtering,
            can_hide: self.can_hide,
            hidden_by_default: self.hidden_by_default,
            export: self.export.clone(),
        }
    }
}

impl<R> fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("hidden_by_default", &self.hidden_by_default)
            .finish_non_exhaustive()
    }
}

impl<R> ColumnDef<R> {
    /// Create a column with the given id, header and accessor.
    pub fn new<F>(id: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            width: None,
            enable_sorting: true,
            enable_filtering: true,
            can_hide: true,
            hidden_by_default: false,
            export: ExportMeta::default(),
        }
    }

    /// Set a fixed width.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Disable sorting for this column.
    pub fn no_sort(mut self) -> Self {
        self.enable_sorting = false;
        self
    }

    /// Disable filtering for this column.
    pub fn no_filter(mut self) -> Self {
        self.enable_filtering = false;
        self
    }

    /// Prevent the user from hiding this column.
    pub fn always_visible(mut self) -> Self {
        self.can_hide = false;
        self
    }

    /// Start the column hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden_by_default = true;
        self
    }

    /// Use a different header in exports.
    pub fn export_header(mut self, name: impl Into<String>) -> Self {
        self.export.header_name = Some(name.into());
        self
    }

    /// Use a custom value in exports.
    pub fn export_value<F>(mut self, value: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.export.value = Some(Arc::new(value));
        self
    }

    /// Leave this column out of exports.
    pub fn exclude_from_export(mut self) -> Self {
        self.export.exclude = true;
        self
    }

    /// Read this column's cell from a row.
    pub fn value(&self, row: &R) -> CellValue {
        (self.accessor)(row)
    }

    /// Read this column's cell as display text.
    pub fn display(&self, row: &R) -> String {
        self.value(row).to_string()
    }

    /// Header used in exports: export name, then display header, then id.
    pub fn export_header_text(&self) -> &str {
        if let Some(name) = self.export.header_name.as_deref() {
            return name;
        }
        if !self.header.is_empty() {
            return &self.header;
        }
        &self.id
    }

    /// Value used in exports: export value, then accessor value.
    pub fn export_cell(&self, row: &R) -> String {
        match &self.export.value {
            Some(f) => f(row).to_string(),
            None => self.display(row),
        }
    }
}
