//! Export and bulk import handlers

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use domain_claims::{ClaimFilter, ImportReport};
use infra_export::{read_rows, ExportError, ExportFormat};

use crate::dto::claims::ExportQuery;
use crate::error::ApiError;
use crate::handlers::attachment;
use crate::AppState;

/// Multipart field carrying the upload
pub const UPLOAD_FIELD: &str = "file";

/// Downloads the filtered claim list; a copy lands in the backups
pub async fn export_claims(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    Query(filter): Query<ClaimFilter>,
) -> Result<Response, ApiError> {
    let requested = query.format.as_deref().unwrap_or("excel");
    let format = ExportFormat::parse(requested)
        .ok_or_else(|| ExportError::UnsupportedFormat(requested.to_string()))?;

    let file = state.exporter.export(format, &filter).await?;
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, attachment(&file.file_name)),
        ],
        file.bytes,
    )
        .into_response())
}

/// Imports an `.xlsx`, `.xls` or `.csv` upload row by row
pub async fn import_claims(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("Please select a file to upload".to_string()))?;

    let rows = read_rows(&bytes, &file_name).map_err(|e| match e {
        e @ ExportError::UnsupportedFileType(_) => ApiError::from(e),
        other => ApiError::BadRequest(format!("Error processing file: {}", other)),
    })?;

    let report = state.claims.import_rows(rows).await;
    info!(
        file = %file_name,
        created = report.created_count(),
        skipped = report.skipped_count(),
        errors = report.error_count(),
        "Upload imported"
    );
    Ok(Json(report))
}
