//! Procurement requests, purchase orders and service requests.

use serde_json::Value;

use super::{amount_column, facet_options, field_column};
use crate::api::{field_str, Record};
use crate::table::{ColumnDef, TableOptions};

pub const PR_FIELDS: &[&str] = &[
    "name",
    "project",
    "work_package",
    "workflow_state",
    "owner",
    "procurement_list",
    "creation",
];

pub const PO_FIELDS: &[&str] = &[
    "name",
    "project",
    "vendor_name",
    "procurement_request",
    "status",
    "total_amount",
    "creation",
];

pub const SR_FIELDS: &[&str] = &["name", "project", "vendor", "service_category", "status", "creation"];

const PR_STATES: &[&str] = &[
    "Pending",
    "Approved",
    "Rejected",
    "Vendor Selected",
    "Partially Approved",
    "Vendor Approved",
    "Delayed",
    "Sent Back",
];

const PO_STATES: &[&str] = &[
    "PO Approved",
    "Dispatched",
    "Partially Delivered",
    "Delivered",
    "PO Amendment",
    "Cancelled",
];

const SR_STATES: &[&str] = &["Created", "Pending", "Approved", "Rejected", "Amendment"];

/// The order list as stored: either JSON text or an embedded object.
fn serialized_order_list(record: &Record) -> String {
    match record.get("procurement_list") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Text matched by the procurement request search box.
pub fn pr_haystack(record: &Record) -> String {
    [
        field_str(record, "name"),
        field_str(record, "project"),
        field_str(record, "work_package"),
        &serialized_order_list(record),
    ]
    .join(" ")
}

pub fn pr_columns() -> Vec<ColumnDef<Record>> {
    vec![
        field_column("name", "ID").width(18).always_visible(),
        field_column("project", "Project"),
        field_column("work_package", "Package"),
        field_column("workflow_state", "Status").width(18),
        field_column("owner", "Created By").hidden(),
        ColumnDef::new("procurement_list", "Items", |r: &Record| {
            serialized_order_list(r).into()
        })
        .hidden()
        .no_sort(),
        field_column("creation", "Created").width(20),
    ]
}

pub fn pr_options(options: TableOptions<Record>) -> TableOptions<Record> {
    options
        .item_search(pr_haystack)
        .facet("workflow_state", facet_options(PR_STATES))
}

pub fn po_columns() -> Vec<ColumnDef<Record>> {
    vec![
        field_column("name", "PO").width(22).always_visible(),
        field_column("project", "Project"),
        field_column("vendor_name", "Vendor"),
        field_column("procurement_request", "PR").hidden(),
        field_column("status", "Status").width(20),
        amount_column("total_amount", "Amount").width(14),
        field_column("creation", "Created").width(20),
    ]
}

pub fn po_options(options: TableOptions<Record>) -> TableOptions<Record> {
    options
        .search_field("name")
        .facet("status", facet_options(PO_STATES))
}

pub fn sr_columns() -> Vec<ColumnDef<Record>> {
    vec![
        field_column("name", "SR").width(18).always_visible(),
        field_column("project", "Project"),
        field_column("vendor", "Vendor"),
        field_column("service_category", "Category"),
        field_column("status", "Status").width(14),
        field_column("creation", "Created").width(20),
    ]
}

pub fn sr_options(options: TableOptions<Record>) -> TableOptions<Record> {
    options
        .search_field("name")
        .facet("status", facet_options(SR_STATES))
}
