//! Backup handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use infra_export::format::content_type_for;
use infra_export::{BackupListing, BackupRun, ExportFormat, WeeklyStatus};

use crate::error::ApiError;
use crate::handlers::attachment;
use crate::AppState;

/// Stored backups per format, newest first
pub async fn browse_backups(
    State(state): State<AppState>,
) -> Result<Json<BackupListing>, ApiError> {
    Ok(Json(state.exporter.backups().list_all().await?))
}

pub async fn download_backup(
    State(state): State<AppState>,
    Path((format, file_name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::parse(&format)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown backup format {}", format)))?;

    let bytes = state
        .exporter
        .backups()
        .read(format, &file_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Backup file {} not found", file_name)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&file_name).to_string()),
            (header::CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

/// Writes every format now as `manual_backup_{YYYYMMDD_HHMMSS}`
pub async fn manual_backup(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<BackupRun>), ApiError> {
    let run = state.exporter.manual_backup().await?;
    Ok((StatusCode::CREATED, Json(run)))
}

pub async fn weekly_status(
    State(state): State<AppState>,
) -> Result<Json<WeeklyStatus>, ApiError> {
    let running = state.scheduler.is_running().await;
    Ok(Json(state.exporter.weekly_status(running).await?))
}

/// Runs the weekly backup now (excel only) and restarts the weekly countdown
pub async fn trigger_weekly_backup(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<BackupRun>), ApiError> {
    let run = state.exporter.trigger_weekly().await?;
    Ok((StatusCode::CREATED, Json(run)))
}
