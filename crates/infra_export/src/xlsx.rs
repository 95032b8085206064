//! Excel workbook writer

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use domain_claims::ClaimRecord;

use crate::columns::{render_row, HEADERS};
use crate::error::ExportError;

pub const SHEET_NAME: &str = "Shipments";

const HEADER_FILL: u32 = 0x2563EB;
const MAX_COLUMN_WIDTH: usize = 50;

/// Column width for the longest rendered value, padded by two
fn column_width(longest: usize) -> f64 {
    (longest + 2).min(MAX_COLUMN_WIDTH) as f64
}

/// Writes one "Shipments" sheet with a frozen, styled header row
pub fn write_workbook(records: &[ClaimRecord]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, value) in render_row(record).into_iter().enumerate() {
            widths[col] = widths[col].max(value.chars().count());
            sheet.write_string(row, col as u16, value)?;
        }
    }

    for (col, longest) in widths.into_iter().enumerate() {
        sheet.set_column_width(col as u16, column_width(longest))?;
    }
    sheet.set_freeze_panes(1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_width_is_capped() {
        assert_eq!(column_width(8), 10.0);
        assert_eq!(column_width(120), 50.0);
    }

    #[test]
    fn test_empty_workbook_is_a_zip() {
        let bytes = write_workbook(&[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
