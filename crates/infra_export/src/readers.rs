//! Upload readers for bulk import
//!
//! Both readers drop the header row and hand back the data rows as
//! [`SheetCell`]s; positional meaning is decided by the import parser.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;

use domain_claims::SheetCell;

use crate::error::ExportError;

/// Upload kinds accepted for import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Workbook,
    Csv,
}

impl UploadKind {
    /// By file extension: `.xlsx`/`.xls` or `.csv`, case-insensitive
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.trim().to_ascii_lowercase();
        if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Some(UploadKind::Workbook)
        } else if lower.ends_with(".csv") {
            Some(UploadKind::Csv)
        } else {
            None
        }
    }
}

/// Reads the data rows of an uploaded file
pub fn read_rows(bytes: &[u8], file_name: &str) -> Result<Vec<Vec<SheetCell>>, ExportError> {
    match UploadKind::from_file_name(file_name) {
        Some(UploadKind::Workbook) => read_workbook(bytes),
        Some(UploadKind::Csv) => read_csv(bytes),
        None => Err(ExportError::UnsupportedFileType(file_name.to_string())),
    }
}

/// First worksheet of an xlsx or xls workbook
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<SheetCell>>, ExportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExportError::Spreadsheet("workbook has no worksheets".to_string()))??;

    Ok(range
        .rows()
        .skip(1)
        .map(|row| row.iter().map(to_cell).collect())
        .collect())
}

pub fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<SheetCell>>, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(SheetCell::from).collect());
    }
    Ok(rows)
}

fn to_cell(value: &Data) -> SheetCell {
    match value {
        Data::Int(i) => SheetCell::Number(*i as f64),
        Data::Float(f) => SheetCell::Number(*f),
        Data::String(s) => SheetCell::from(s.as_str()),
        Data::Bool(b) => SheetCell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(at) => SheetCell::Date(at.date()),
            None => SheetCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .map(SheetCell::Date)
            .unwrap_or_else(|| SheetCell::from(s.as_str())),
        Data::DurationIso(s) => SheetCell::from(s.as_str()),
        Data::Error(_) | Data::Empty => SheetCell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_kind_by_extension() {
        assert_eq!(UploadKind::from_file_name("claims.XLSX"), Some(UploadKind::Workbook));
        assert_eq!(UploadKind::from_file_name("old.xls"), Some(UploadKind::Workbook));
        assert_eq!(UploadKind::from_file_name("rows.csv"), Some(UploadKind::Csv));
        assert_eq!(UploadKind::from_file_name("notes.txt"), None);
    }

    #[test]
    fn test_unsupported_upload_is_rejected() {
        let err = read_rows(b"anything", "notes.txt").unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFileType(name) if name == "notes.txt"));
    }

    #[test]
    fn test_csv_rows_skip_header() {
        let data = b"Shipment No,Brand,Claimant\nS1,Acme,Jane\nS2,, \n";
        let rows = read_csv(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], SheetCell::Text("S1".to_string()));
        assert_eq!(rows[1][1], SheetCell::Empty);
        assert_eq!(rows[1][2], SheetCell::Empty);
    }

    #[test]
    fn test_iso_date_cells_become_dates() {
        let cell = to_cell(&Data::DateTimeIso("2025-06-01T00:00:00".to_string()));
        assert_eq!(cell, SheetCell::Date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
    }
}
