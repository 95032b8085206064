//! PDF report writer
//!
//! Landscape letter pages with a title block, a filled header row repeated
//! on every page and alternating row shading. Long text cells are clipped
//! so rows stay on one line.

use chrono::NaiveDate;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb,
};

use domain_claims::ClaimRecord;

use crate::columns::{render_row, BRAND, CLAIMANT, CLIENT_NAME, HEADERS, SHIPMENT_NO};
use crate::error::ExportError;

const PAGE_WIDTH: f32 = 279.4;
const PAGE_HEIGHT: f32 = 215.9;
const MARGIN: f32 = 10.0;
const ROW_HEIGHT: f32 = 5.0;
const TITLE_SIZE: f32 = 14.0;
const INFO_SIZE: f32 = 8.0;
const HEADER_SIZE: f32 = 6.5;
const DATA_SIZE: f32 = 6.0;
const LAYER: &str = "Layer 1";

/// Column widths in millimetres, in header order
const WIDTHS: [f32; 19] = [
    18.0, 12.0, 15.0, 16.0, 18.0, 8.0, 12.0, 8.0, 12.0, 14.0, 14.0, 14.0, 14.0, 9.0, 14.0, 16.0,
    14.0, 13.0, 12.0,
];

const HEADER_FILL: (f32, f32, f32) = (0.145, 0.388, 0.922);
const STRIPE_FILL: (f32, f32, f32) = (0.945, 0.961, 0.976);

/// Clips `text` to `keep` characters plus an ellipsis when longer than `limit`
pub fn clip(text: &str, limit: usize, keep: usize) -> String {
    if text.chars().count() > limit {
        let mut clipped: String = text.chars().take(keep).collect();
        clipped.push_str("...");
        clipped
    } else {
        text.to_string()
    }
}

fn clip_row(mut row: Vec<String>) -> Vec<String> {
    row[SHIPMENT_NO] = clip(&row[SHIPMENT_NO], 15, 12);
    row[BRAND] = clip(&row[BRAND], 8, 8);
    row[CLAIMANT] = clip(&row[CLAIMANT], 10, 10);
    row[CLIENT_NAME] = clip(&row[CLIENT_NAME], 12, 12);
    row
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn fill_band(layer: &PdfLayerReference, top: f32, color: (f32, f32, f32)) {
    let left = MARGIN;
    let right = MARGIN + WIDTHS.iter().sum::<f32>();
    let bottom = top - ROW_HEIGHT;
    layer.set_fill_color(rgb(color));
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(left), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(top)), false),
            (Point::new(Mm(left), Mm(top)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

fn write_cells(layer: &PdfLayerReference, cells: &[String], top: f32, size: f32, font: &IndirectFontRef) {
    let baseline = top - ROW_HEIGHT + 1.5;
    let mut x = MARGIN + 1.0;
    for (cell, width) in cells.iter().zip(WIDTHS) {
        layer.use_text(cell.as_str(), size, Mm(x), Mm(baseline), font);
        x += width;
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn table_header(layer: &PdfLayerReference, top: f32, fonts: &Fonts) -> f32 {
    let titles: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    fill_band(layer, top, HEADER_FILL);
    layer.set_fill_color(rgb((1.0, 1.0, 1.0)));
    write_cells(layer, &titles, top, HEADER_SIZE, &fonts.bold);
    layer.set_fill_color(rgb((0.0, 0.0, 0.0)));
    top - ROW_HEIGHT
}

/// Renders the claims report titled `Claims Report - YYYY-MM-DD`
pub fn write_report(records: &[ClaimRecord], generated_on: NaiveDate) -> Result<Vec<u8>, ExportError> {
    let title = format!("Claims Report - {}", generated_on.format("%Y-%m-%d"));
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(ExportError::pdf)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(ExportError::pdf)?,
    };

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN - 4.0;
    current.use_text(title.as_str(), TITLE_SIZE, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= 6.0;
    current.use_text(
        format!("Total records: {}", records.len()),
        INFO_SIZE,
        Mm(MARGIN),
        Mm(y),
        &fonts.regular,
    );
    y = table_header(&current, y - 3.0, &fonts);

    for (index, record) in records.iter().enumerate() {
        if y - ROW_HEIGHT < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            current = doc.get_page(page).get_layer(layer);
            y = table_header(&current, PAGE_HEIGHT - MARGIN, &fonts);
        }
        if index % 2 == 1 {
            fill_band(&current, y, STRIPE_FILL);
            current.set_fill_color(rgb((0.0, 0.0, 0.0)));
        }
        write_cells(&current, &clip_row(render_row(record)), y, DATA_SIZE, &fonts.regular);
        y -= ROW_HEIGHT;
    }

    drop(current);
    doc.save_to_bytes().map_err(ExportError::pdf)
}
