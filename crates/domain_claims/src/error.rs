//! Claims domain errors

use thiserror::Error;

use core_kernel::{AllocationError, PortError, ShipmentId};

use crate::import::RowError;
use crate::validation::FieldError;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Claim number {claim_no} already exists")]
    DuplicateClaimNo {
        claim_no: String,
        existing: ShipmentId,
    },

    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Client {client} has {claims} claim(s); deletion must be confirmed")]
    ConfirmationRequired { client: String, claims: u64 },

    #[error(transparent)]
    Row(#[from] RowError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Port(PortError),
}

impl From<PortError> for ClaimError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Allocation(inner) => ClaimError::Allocation(inner),
            other => ClaimError::Port(other),
        }
    }
}

impl ClaimError {
    /// Single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClaimError::Validation(vec![FieldError::new(field, message)])
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
