//! Request handlers

pub mod analytics;
pub mod auth;
pub mod backups;
pub mod claims;
pub mod clients;
pub mod health;
pub mod transfer;

use validator::Validate;

use crate::error::ApiError;

/// Runs derive-based request checks, reporting `field: message` details
pub(crate) fn validate_request<T: Validate>(request: &T) -> Result<(), ApiError> {
    request.validate().map_err(|errors| {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    format!("{}: {}", field, e.message.as_deref().unwrap_or("invalid value"))
                })
            })
            .collect();
        details.sort();
        ApiError::validation("Validation failed", details)
    })
}

/// `attachment` disposition with a quoted file name
pub(crate) fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name.replace('"', "_"))
}
