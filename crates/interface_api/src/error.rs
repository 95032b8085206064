//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_claims::ClaimError;
use infra_export::{BackupError, ExportError};

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("Allocation error: {0}")]
    Allocation(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, details: Vec<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::Allocation(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "allocation_error", msg, None),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None),
        };

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), error = error_type, %message, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{} {} not found", entity_type, id))
            }
            PortError::Validation { message, field } => {
                let details = field.map(|f| vec![format!("{}: {}", f, message)]).unwrap_or_default();
                ApiError::validation(message, details)
            }
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Allocation(inner) => ApiError::Allocation(inner.to_string()),
            PortError::Connection { message, .. } => ApiError::Unavailable(message),
            PortError::Internal { message, .. } => ApiError::Internal(message),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation(errors) => ApiError::validation(
                "Validation failed",
                errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect(),
            ),
            e @ ClaimError::DuplicateClaimNo { .. } => ApiError::Conflict(e.to_string()),
            e @ ClaimError::ConfirmationRequired { .. } => ApiError::Conflict(e.to_string()),
            e @ (ClaimError::ClaimNotFound(_) | ClaimError::ClientNotFound(_)) => {
                ApiError::NotFound(e.to_string())
            }
            ClaimError::Row(e) => ApiError::BadRequest(e.to_string()),
            ClaimError::Allocation(e) => ApiError::Allocation(e.to_string()),
            ClaimError::Port(e) => e.into(),
        }
    }
}

impl From<BackupError> for ApiError {
    fn from(err: BackupError) -> Self {
        match err {
            e @ BackupError::InvalidName(_) => ApiError::BadRequest(e.to_string()),
            e @ BackupError::Io { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            e @ (ExportError::UnsupportedFormat(_) | ExportError::UnsupportedFileType(_)) => {
                ApiError::BadRequest(e.to_string())
            }
            ExportError::Claims(e) => e.into(),
            ExportError::Backup(e) => e.into(),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired => {
                ApiError::Unauthorized
            }
            AuthError::Hashing(msg) => ApiError::Internal(msg),
        }
    }
}
