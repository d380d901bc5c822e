//! Project payments and their reports.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::warn;

use super::{amount_column, cell, facet_options, field_column};
use crate::api::{field_str, Record};
use crate::table::{CellValue, ColumnDef, TableOptions};

pub const FIELDS: &[&str] = &[
    "name",
    "project",
    "vendor",
    "document_type",
    "document_name",
    "amount",
    "tds",
    "utr",
    "payment_date",
    "status",
    "creation",
];

/// `bank`: approved payments still waiting for a UTR, one line per payment.
/// `summary`: totals per project and vendor.
pub const REPORT_TYPES: &[&str] = &["bank", "summary"];

const STATES: &[&str] = &["Requested", "Approved", "Paid", "Rejected"];

pub fn columns() -> Vec<ColumnDef<Record>> {
    vec![
        field_column("name", "ID").width(16).always_visible(),
        field_column("project", "Project"),
        field_column("vendor", "Vendor").export_header("Beneficiary Name"),
        field_column("document_type", "Type").hidden(),
        field_column("document_name", "Document"),
        amount_column("amount", "Amount").width(14),
        amount_column("tds", "TDS").width(10).hidden(),
        field_column("utr", "UTR").width(16).export_header("UTR Number"),
        field_column("payment_date", "Paid On").width(12),
        field_column("status", "Status").width(10),
        field_column("creation", "Created").width(20).hidden(),
    ]
}

pub fn options(options: TableOptions<Record>) -> TableOptions<Record> {
    options
        .facet("status", facet_options(STATES))
        .export_button()
        .report_export("project_payments", report_rows)
}

fn amount_of(record: &Record) -> f64 {
    match cell(record, "amount") {
        CellValue::Int(n) => n as f64,
        CellValue::Float(n) => n,
        CellValue::Text(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Rows for one report type, derived from every loaded payment.
pub fn report_rows(rows: &[Record], report_type: &str) -> Vec<Record> {
    match report_type {
        "bank" => rows
            .iter()
            .filter(|r| field_str(r, "status") == "Approved" && field_str(r, "utr").is_empty())
            .cloned()
            .collect(),
        "summary" => summary(rows),
        other => {
            warn!(report_type = other, "Unknown payment report type");
            Vec::new()
        }
    }
}

fn summary(rows: &[Record]) -> Vec<Record> {
    let mut totals: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for row in rows.iter().filter(|r| field_str(r, "status") != "Rejected") {
        let entry = totals
            .entry((field_str(row, "project"), field_str(row, "vendor")))
            .or_default();
        entry.0 += amount_of(row);
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|((project, vendor), (amount, count))| {
            let value = json!({
                "project": project,
                "vendor": vendor,
                "document_name": format!("{} payment{}", count, if count == 1 { "" } else { "s" }),
                "amount": amount,
            });
            match value {
                Value::Object(map) => map,
                _ => Record::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{to_csv_string, CsvExporter, ExportOutcome};
    use crate::table::DataTable;

    fn payment(name: &str, project: &str, vendor: &str, amount: f64, status: &str, utr: &str) -> Record {
        match json!({
            "name": name,
            "project": project,
            "vendor": vendor,
            "document_name": format!("PO/{}", name),
            "amount": amount,
            "utr": utr,
            "status": status,
            "creation": format!("2024-02-{} 09:00:00", &name[4..]),
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn payments() -> Vec<Record> {
        vec![
            payment("PAY-10", "Tower A", "Acme, Pvt. Ltd.", 1500.0, "Approved", ""),
            payment("PAY-11", "Tower A", "Acme, Pvt. Ltd.", 500.5, "Paid", "UTR9"),
            payment("PAY-12", "Tower B", "Bolt", 20.0, "Approved", ""),
            payment("PAY-13", "Tower B", "Bolt", 99.0, "Rejected", ""),
        ]
    }

    #[test]
    fn test_bank_report_selects_unpaid_approved() {
        let rows = report_rows(&payments(), "bank");
        let names: Vec<&str> = rows.iter().map(|r| field_str(r, "name")).collect();
        assert_eq!(names, vec!["PAY-10", "PAY-12"]);
    }

    #[test]
    fn test_summary_totals_per_project_vendor() {
        let rows = report_rows(&payments(), "summary");
        assert_eq!(rows.len(), 2);
        assert_eq!(field_str(&rows[0], "vendor"), "Acme, Pvt. Ltd.");
        assert_eq!(amount_of(&rows[0]), 2000.5);
        assert_eq!(field_str(&rows[0], "document_name"), "2 payments");
        assert_eq!(field_str(&rows[1], "document_name"), "1 payment");
    }

    #[test]
    fn test_unknown_report_is_empty() {
        assert!(report_rows(&payments(), "ledger").is_empty());
    }

    #[test]
    fn test_bank_sheet_quotes_vendor_with_comma() {
        let rows = report_rows(&payments(), "bank");
        let text = to_csv_string(rows.iter(), &columns()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Project,Beneficiary Name,Type,Document,Amount,TDS,UTR Number,Paid On,Status,Created")
        );
        assert!(lines
            .next()
            .is_some_and(|l| l.starts_with("PAY-10,Tower A,\"Acme, Pvt. Ltd.\",,PO/PAY-10,1500.00,")));
    }

    #[test]
    fn test_report_export_through_table() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let mut table = DataTable::new("payments", columns(), options(TableOptions::default())).unwrap();
        table.set_rows(payments());

        match table.export_report(&exporter, "bank") {
            ExportOutcome::Exported { path, rows } => {
                assert_eq!(rows, 2);
                assert!(path.ends_with("project_payments_bank.csv"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_selection_is_per_table() {
        let mut a = DataTable::new("payments", columns(), options(TableOptions::default())).unwrap();
        let mut b = DataTable::new("payments2", columns(), options(TableOptions::default())).unwrap();
        a.set_rows(payments());
        b.set_rows(payments());

        a.toggle_cursor_selection();
        assert_eq!(a.selected_rows().len(), 1);
        assert!(b.selected_rows().is_empty());
    }
}
