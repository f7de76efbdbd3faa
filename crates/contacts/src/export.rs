//! Delimited-text export of contact records
//!
//! Two flavours share one column order (id, name, email, subject, message,
//! time, status, source):
//!
//! - [`ExportFormat::Csv`] quotes every field and keeps the timestamp whole.
//! - [`ExportFormat::Excel`] splits the timestamp into date and time columns,
//!   quotes only fields that need it, and starts with a UTF-8 byte-order mark
//!   so spreadsheet applications detect the encoding.

use chrono::{NaiveDate, SecondsFormat};
use std::borrow::Cow;

use crate::models::ContactRecord;

/// UTF-8 byte-order mark
pub const BOM: char = '\u{FEFF}';

const CSV_HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "Subject",
    "Message",
    "Timestamp",
    "Status",
    "Source",
];

const EXCEL_HEADERS: [&str; 9] = [
    "ID", "Name", "Email", "Subject", "Message", "Date", "Time", "Status", "Source",
];

/// Export flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Plain CSV, every field quoted
    Csv,
    /// Spreadsheet-friendly CSV with BOM and split date/time
    Excel,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => "text/csv;charset=utf-8",
        }
    }

    /// File name for an export taken on `date`
    pub fn file_name(&self, date: NaiveDate) -> String {
        let stamp = date.format("%Y-%m-%d");
        match self {
            ExportFormat::Csv => format!("portfolio-contacts-{}.csv", stamp),
            ExportFormat::Excel => format!("portfolio-contacts-{}.xlsx.csv", stamp),
        }
    }
}

/// A rendered export, ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub contents: String,
}

impl ExportFile {
    pub fn bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }
}

/// Render records in the given format
///
/// Output is header plus one line per record, joined by `\n` with no
/// trailing newline. The Excel flavour is prefixed with [`BOM`].
pub fn render(records: &[ContactRecord], format: ExportFormat) -> String {
    match format {
        ExportFormat::Csv => render_csv(records),
        ExportFormat::Excel => render_excel(records),
    }
}

/// Render and name an export taken on `date`
pub fn export_file(records: &[ContactRecord], format: ExportFormat, date: NaiveDate) -> ExportFile {
    ExportFile {
        file_name: format.file_name(date),
        content_type: format.content_type(),
        contents: render(records, format),
    }
}

fn render_csv(records: &[ContactRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(join_row(CSV_HEADERS.iter().copied(), quote_always));

    for record in records {
        let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let row: [&str; 8] = [
            record.id.as_str(),
            &record.name,
            &record.email,
            &record.subject,
            &record.message,
            &timestamp,
            record.status.as_str(),
            &record.source,
        ];
        lines.push(join_row(row.into_iter(), quote_always));
    }

    lines.join("\n")
}

fn render_excel(records: &[ContactRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(join_row(EXCEL_HEADERS.iter().copied(), quote_if_needed));

    for record in records {
        let date = record.timestamp.format("%Y-%m-%d").to_string();
        let time = record.timestamp.format("%H:%M:%S").to_string();
        let row: [&str; 9] = [
            record.id.as_str(),
            &record.name,
            &record.email,
            &record.subject,
            &record.message,
            &date,
            &time,
            record.status.as_str(),
            &record.source,
        ];
        lines.push(join_row(row.into_iter(), quote_if_needed));
    }

    let mut out = String::new();
    out.push(BOM);
    out.push_str(&lines.join("\n"));
    out
}

fn join_row<'a, I, F>(fields: I, quote: F) -> String
where
    I: Iterator<Item = &'a str>,
    F: Fn(&'a str) -> Cow<'a, str>,
{
    fields.map(quote).collect::<Vec<_>>().join(",")
}

fn quote_always(field: &str) -> Cow<'_, str> {
    Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
}

fn quote_if_needed(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        quote_always(field)
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInput, ContactStatus};
    use chrono::{TimeZone, Utc};

    fn record(subject: &str, message: &str) -> ContactRecord {
        let at = Utc.with_ymd_and_hms(2024, 7, 4, 15, 5, 9).unwrap();
        let mut r = ContactRecord::from_input(
            ContactInput::new("Jo \"JJ\" Smith", "jo@example.com", subject, message),
            at,
        );
        r.id = crate::models::ContactId::new("id-1");
        r
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let out = render(&[record("Plain", "Hello")], ExportFormat::Csv);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            r#""ID","Name","Email","Subject","Message","Timestamp","Status","Source""#
        );
        assert_eq!(
            lines[1],
            r#""id-1","Jo ""JJ"" Smith","jo@example.com","Plain","Hello","2024-07-04T15:05:09.000Z","pending","Portfolio Contact Form""#
        );
    }

    #[test]
    fn test_csv_line_count() {
        let records: Vec<_> = (0..5).map(|i| record(&format!("s{}", i), "m")).collect();
        let out = render(&records, ExportFormat::Csv);
        assert_eq!(out.lines().count(), 6);
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let out = render(&[], ExportFormat::Csv);
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_excel_conditional_quoting_and_bom() {
        let mut replied = record("Hi, there", "line one\nline two");
        replied.status = ContactStatus::Replied;
        let out = render(&[replied], ExportFormat::Excel);

        assert!(out.starts_with(BOM));
        let body = out.trim_start_matches(BOM);
        assert!(body.starts_with("ID,Name,Email,Subject,Message,Date,Time,Status,Source\n"));
        assert!(body.contains(
            "id-1,\"Jo \"\"JJ\"\" Smith\",jo@example.com,\"Hi, there\",\"line one\nline two\",2024-07-04,15:05:09,replied,Portfolio Contact Form"
        ));
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(
            ExportFormat::Csv.file_name(date),
            "portfolio-contacts-2025-01-09.csv"
        );
        assert_eq!(
            ExportFormat::Excel.file_name(date),
            "portfolio-contacts-2025-01-09.xlsx.csv"
        );

        let file = export_file(&[], ExportFormat::Excel, date);
        assert_eq!(file.content_type, "text/csv;charset=utf-8");
        assert!(file.bytes().starts_with(&[0xEF, 0xBB, 0xBF]));
    }
}
