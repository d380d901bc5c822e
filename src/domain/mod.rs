//! The doctypes procura lists, and how each one becomes a table.

mod payments;
mod procurement;
mod projects;

use std::time::Duration;

use clap::ValueEnum;
use serde_json::Value;

use crate::api::{field_str, Record};
use crate::table::{CellValue, ColumnDef, DataTable, FacetOption, TableError, TableOptions};

pub use payments::{report_rows, REPORT_TYPES};

/// One tab per doctype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DoctypeKind {
    ProcurementRequests,
    PurchaseOrders,
    ServiceRequests,
    Projects,
    ProjectPayments,
}

impl DoctypeKind {
    pub const ALL: [DoctypeKind; 5] = [
        DoctypeKind::ProcurementRequests,
        DoctypeKind::PurchaseOrders,
        DoctypeKind::ServiceRequests,
        DoctypeKind::Projects,
        DoctypeKind::ProjectPayments,
    ];

    /// Tab title.
    pub fn title(self) -> &'static str {
        match self {
            DoctypeKind::ProcurementRequests => "Procurement Requests",
            DoctypeKind::PurchaseOrders => "Purchase Orders",
            DoctypeKind::ServiceRequests => "Service Requests",
            DoctypeKind::Projects => "Projects",
            DoctypeKind::ProjectPayments => "Payments",
        }
    }

    /// Frappe doctype name.
    pub fn doctype(self) -> &'static str {
        match self {
            DoctypeKind::ProcurementRequests => "Procurement Requests",
            DoctypeKind::PurchaseOrders => "Procurement Orders",
            DoctypeKind::ServiceRequests => "Service Requests",
            DoctypeKind::Projects => "Projects",
            DoctypeKind::ProjectPayments => "Project Payments",
        }
    }

    /// View-state namespace for this doctype's table.
    pub fn namespace(self) -> &'static str {
        match self {
            DoctypeKind::ProcurementRequests => "pr",
            DoctypeKind::PurchaseOrders => "po",
            DoctypeKind::ServiceRequests => "sr",
            DoctypeKind::Projects => "projects",
            DoctypeKind::ProjectPayments => "payments",
        }
    }

    /// Fields requested from the list endpoint.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            DoctypeKind::ProcurementRequests => procurement::PR_FIELDS,
            DoctypeKind::PurchaseOrders => procurement::PO_FIELDS,
            DoctypeKind::ServiceRequests => procurement::SR_FIELDS,
            DoctypeKind::Projects => projects::FIELDS,
            DoctypeKind::ProjectPayments => payments::FIELDS,
        }
    }

    /// Whether the table pages through the server instead of loading everything.
    pub fn is_server_mode(self) -> bool {
        matches!(
            self,
            DoctypeKind::PurchaseOrders | DoctypeKind::ServiceRequests | DoctypeKind::Projects
        )
    }

    /// Report types offered for report export.
    pub fn report_types(self) -> &'static [&'static str] {
        match self {
            DoctypeKind::ProjectPayments => REPORT_TYPES,
            _ => &[],
        }
    }

    pub fn columns(self) -> Vec<ColumnDef<Record>> {
        match self {
            DoctypeKind::ProcurementRequests => procurement::pr_columns(),
            DoctypeKind::PurchaseOrders => procurement::po_columns(),
            DoctypeKind::ServiceRequests => procurement::sr_columns(),
            DoctypeKind::Projects => projects::columns(),
            DoctypeKind::ProjectPayments => payments::columns(),
        }
    }

    pub fn options(self) -> TableOptions<Record> {
        let options = TableOptions::default().row_id(|r: &Record, i| match field_str(r, "name") {
            "" => i.to_string(),
            name => name.to_string(),
        });
        match self {
            DoctypeKind::ProcurementRequests => procurement::pr_options(options),
            DoctypeKind::PurchaseOrders => procurement::po_options(options),
            DoctypeKind::ServiceRequests => procurement::sr_options(options),
            DoctypeKind::Projects => projects::options(options),
            DoctypeKind::ProjectPayments => payments::options(options),
        }
    }

    /// A fresh table for this doctype.
    pub fn build_table(self, debounce: Duration) -> Result<DataTable<Record>, TableError> {
        let table = DataTable::new(
            self.namespace(),
            self.columns(),
            self.options().debounce(debounce),
        )?;
        Ok(if self.is_server_mode() {
            table.server_mode()
        } else {
            table
        })
    }
}

/// Read a field as a cell, keeping numbers numeric.
pub fn cell(record: &Record, field: &str) -> CellValue {
    match record.get(field) {
        None | Some(Value::Null) => CellValue::Empty,
        Some(Value::String(s)) => CellValue::Text(s.clone()),
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => n.as_f64().map(CellValue::Float).unwrap_or_default(),
        },
        Some(other) => CellValue::Text(other.to_string()),
    }
}

/// A plain column reading `field`.
fn field_column(field: &'static str, header: &str) -> ColumnDef<Record> {
    ColumnDef::new(field, header, move |r: &Record| cell(r, field))
}

/// Money shown with two decimals; exported unformatted.
fn amount_column(field: &'static str, header: &str) -> ColumnDef<Record> {
    ColumnDef::new(field, header, move |r: &Record| cell(r, field))
        .export_value(move |r: &Record| match cell(r, field) {
            CellValue::Int(n) => CellValue::Text(format!("{}.00", n)),
            CellValue::Float(n) => CellValue::Text(format!("{:.2}", n)),
            other => other,
        })
}

/// Facet options with identical label and value.
fn facet_options(values: &[&str]) -> Vec<FacetOption> {
    values.iter().map(|v| FacetOption::new(*v, *v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_cell_types() {
        let r = record(json!({"a": "x", "b": 3, "c": 2.5, "d": null, "e": true, "f": [1]}));
        assert_eq!(cell(&r, "a"), CellValue::text("x"));
        assert_eq!(cell(&r, "b"), CellValue::Int(3));
        assert_eq!(cell(&r, "c"), CellValue::Float(2.5));
        assert_eq!(cell(&r, "d"), CellValue::Empty);
        assert_eq!(cell(&r, "e"), CellValue::Bool(true));
        assert_eq!(cell(&r, "f"), CellValue::text("[1]"));
        assert_eq!(cell(&r, "missing"), CellValue::Empty);
    }

    #[test]
    fn test_every_doctype_builds() {
        for kind in DoctypeKind::ALL {
            let table = kind.build_table(Duration::from_millis(10)).unwrap();
            assert_eq!(table.is_server_mode(), kind.is_server_mode());
            assert_eq!(table.namespace(), kind.namespace());
            for field in kind.fields() {
                assert!(!field.is_empty());
            }
        }
    }

    #[test]
    fn test_every_table_defaults_to_creation_desc() {
        for kind in DoctypeKind::ALL {
            let table = kind.build_table(Duration::from_millis(10)).unwrap();
            assert_eq!(table.state().sort_of("creation"), Some(true), "{:?}", kind);
        }
    }

    #[test]
    fn test_row_id_prefers_name() {
        let options = DoctypeKind::Projects.options();
        let row_id = options.row_id.unwrap();
        assert_eq!(row_id(&record(json!({"name": "PROJ-1"})), 4), "PROJ-1");
        assert_eq!(row_id(&record(json!({})), 4), "4");
    }

    #[test]
    fn test_amount_export_value() {
        let col = amount_column("amount", "Amount");
        assert_eq!(col.export_cell(&record(json!({"amount": 1500}))), "1500.00");
        assert_eq!(col.export_cell(&record(json!({"amount": 20.5}))), "20.50");
    }
}
