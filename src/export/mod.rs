//! CSV export.
//!
//! Every export in the application goes through [`CsvExporter`], which writes
//! RFC 4180 CSV via the `csv` crate. Headers and cells come from the column
//! definitions' export metadata.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::table::ColumnDef;
use crate::ui::Notification;

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export directory or file could not be written.
    #[error("Could not write export: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized.
    #[error("Could not serialize export: {0}")]
    Csv(#[from] csv::Error),

    /// The file name was empty after sanitizing.
    #[error("Invalid export name: '{0}'")]
    InvalidName(String),
}

/// Result of an export request, ready to become a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A file was written.
    Exported {
        /// Where the file was written.
        path: PathBuf,
        /// Number of data rows.
        rows: usize,
    },
    /// Nothing to do; not an error.
    Skipped(String),
    /// The export failed; no file was produced.
    Failed(String),
}

impl ExportOutcome {
    /// The toast to show for this outcome.
    pub fn notification(&self) -> Notification {
        match self {
            ExportOutcome::Exported { path, rows } => Notification::success(format!(
                "Exported {} row{} to {}",
                rows,
                if *rows == 1 { "" } else { "s" },
                path.display()
            )),
            ExportOutcome::Skipped(msg) => Notification::info(msg.clone()),
            ExportOutcome::Failed(msg) => Notification::error(format!("Export failed: {}", msg)),
        }
    }
}

/// Header row for the included columns.
fn header_record<R>(columns: &[ColumnDef<R>]) -> Vec<&str> {
    columns
        .iter()
        .filter(|c| !c.export.exclude)
        .map(|c| c.export_header_text())
        .collect()
}

/// Write rows as CSV to any writer.
pub fn write_csv<'a, R, I, W>(writer: W, rows: I, columns: &[ColumnDef<R>]) -> Result<usize, ExportError>
where
    R: 'a,
    I: IntoIterator<Item = &'a R>,
    W: Write,
{
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    csv.write_record(header_record(columns))?;

    let included: Vec<&ColumnDef<R>> = columns.iter().filter(|c| !c.export.exclude).collect();
    let mut count = 0;
    for row in rows {
        csv.write_record(included.iter().map(|c| c.export_cell(row)))?;
        count += 1;
    }
    csv.flush()?;
    Ok(count)
}

/// Render rows as a CSV string.
pub fn to_csv_string<'a, R, I>(rows: I, columns: &[ColumnDef<R>]) -> Result<String, ExportError>
where
    R: 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut buf = Vec::new();
    write_csv(&mut buf, rows, columns)?;
    // The csv writer only ever receives Rust strings.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes `<name>.csv` files into a directory.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an export called `name` would be written to.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, ExportError> {
        let safe = sanitize_file_name(name);
        if safe.is_empty() {
            return Err(ExportError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.csv", safe)))
    }

    /// Write `rows` to `<dir>/<name>.csv`, replacing any existing file.
    ///
    /// The file is written to a temporary sibling first and renamed into
    /// place, so a failed export never leaves a partial file behind.
    pub fn export<'a, R, I>(
        &self,
        name: &str,
        rows: I,
        columns: &[ColumnDef<R>],
    ) -> Result<PathBuf, ExportError>
    where
        R: 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("csv.part");
        let result = fs::File::create(&tmp)
            .map_err(ExportError::from)
            .and_then(|file| write_csv(io::BufWriter::new(file), rows, columns));
        match result {
            Ok(count) => {
                fs::rename(&tmp, &path)?;
                debug!(path = %path.display(), rows = count, "CSV written");
                Ok(path)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(e)
            }
        }
    }
}

/// Replace characters that are unsafe in file names.
fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    #[derive(Clone)]
    struct Payment {
        utr: &'static str,
        vendor: &'static str,
        amount: f64,
        note: &'static str,
    }

    fn columns() -> Vec<ColumnDef<Payment>> {
        vec![
            ColumnDef::new("select", "", |_: &Payment| CellValue::Empty).exclude_from_export(),
            ColumnDef::new("utr", "UTR", |p: &Payment| p.utr.into()),
            ColumnDef::new("vendor", "Vendor", |p: &Payment| p.vendor.into())
                .export_header("Beneficiary"),
            ColumnDef::new("amount", "Amount", |p: &Payment| p.amount.into())
                .export_value(|p: &Payment| format!("{:.2}", p.amount).into()),
            ColumnDef::new("note", "", |p: &Payment| p.note.into()),
        ]
    }

    fn payments() -> Vec<Payment> {
        vec![
            Payment {
                utr: "UTR001",
                vendor: "Acme, Pvt. Ltd.",
                amount: 1500.0,
                note: "said \"urgent\"",
            },
            Payment {
                utr: "UTR002",
                vendor: "Bolt",
                amount: 20.5,
                note: "line one\nline two",
            },
        ]
    }

    fn parse(text: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_header_mapping() {
        let text = to_csv_string(payments().iter(), &columns()).unwrap();
        let records = parse(&text);
        assert_eq!(records[0], vec!["UTR", "Beneficiary", "Amount", "note"]);
    }

    #[test]
    fn test_special_characters_survive_reparse() {
        let rows = payments();
        let text = to_csv_string(rows.iter(), &columns()).unwrap();
        let records = parse(&text);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            vec!["UTR001", "Acme, Pvt. Ltd.", "1500.00", "said \"urgent\""]
        );
        assert_eq!(records[2], vec!["UTR002", "Bolt", "20.50", "line one\nline two"]);
    }

    #[test]
    fn test_output_is_deterministic() {
        let rows = payments();
        let a = to_csv_string(rows.iter(), &columns()).unwrap();
        let b = to_csv_string(rows.iter(), &columns()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_rows_still_write_header() {
        let rows: Vec<Payment> = Vec::new();
        let text = to_csv_string(rows.iter(), &columns()).unwrap();
        assert_eq!(text, "UTR,Beneficiary,Amount,note\r\n");
    }

    #[test]
    fn test_exporter_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path().join("nested"));
        let rows = payments();

        let path = exporter.export("bank/payments", rows.iter(), &columns()).unwrap();
        assert_eq!(path.file_name().unwrap(), "bank_payments.csv");
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(parse(&text).len(), 3);
        assert!(!path.with_extension("csv.part").exists());
    }

    #[test]
    fn test_exporter_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let rows = payments();
        assert!(matches!(
            exporter.export("  ", rows.iter(), &columns()),
            Err(ExportError::InvalidName(_))
        ));
    }

    #[test]
    fn test_outcome_notifications() {
        use crate::ui::NotificationType;

        let ok = ExportOutcome::Exported {
            path: PathBuf::from("/tmp/x.csv"),
            rows: 1,
        };
        assert_eq!(ok.notification().notification_type, NotificationType::Success);
        assert!(ok.notification().message.contains("1 row to"));

        let failed = ExportOutcome::Failed("Export is not configured".to_string());
        assert_eq!(failed.notification().notification_type, NotificationType::Error);

        let skipped = ExportOutcome::Skipped("No data to export".to_string());
        assert_eq!(skipped.notification().notification_type, NotificationType::Info);
    }
}
