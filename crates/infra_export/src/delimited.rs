//! CSV writer

use domain_claims::ClaimRecord;

use crate::columns::{render_row, HEADERS};
use crate::error::ExportError;

/// Header row then one record per claim
pub fn write_csv(records: &[ClaimRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(render_row(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}
