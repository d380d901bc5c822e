//! Projects.

use super::{facet_options, field_column};
use crate::api::Record;
use crate::table::{ColumnDef, TableOptions};

pub const FIELDS: &[&str] = &[
    "name",
    "project_name",
    "customer",
    "project_city",
    "status",
    "project_start_date",
    "creation",
];

const STATES: &[&str] = &["Created", "WIP", "Completed", "Halted"];

pub fn columns() -> Vec<ColumnDef<Record>> {
    vec![
        field_column("name", "ID").width(16).always_visible(),
        field_column("project_name", "Project"),
        field_column("customer", "Customer"),
        field_column("project_city", "City").width(14),
        field_column("status", "Status").width(12),
        field_column("project_start_date", "Start").width(12).hidden(),
        field_column("creation", "Created").width(20),
    ]
}

pub fn options(options: TableOptions<Record>) -> TableOptions<Record> {
    options
        .search_field("project_name")
        .facet("status", facet_options(STATES))
}
