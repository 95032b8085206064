//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use core_kernel::ShipmentId;
use domain_claims::{ClaimFilter, ClaimForm};

use crate::dto::claims::*;
use crate::error::ApiError;
use crate::AppState;

/// Lists claims, newest first, with optional filters
pub async fn list_claims(
    State(state): State<AppState>,
    Query(filter): Query<ClaimFilter>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let records = state.claims.list_claims(&filter).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Creates a claim, creating its client on first use
pub async fn create_claim(
    State(state): State<AppState>,
    Json(form): Json<ClaimForm>,
) -> Result<(StatusCode, Json<CreatedClaimResponse>), ApiError> {
    let created = state.claims.create_claim(form).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<ShipmentId>,
) -> Result<Json<ClaimResponse>, ApiError> {
    Ok(Json(state.claims.get_claim(id).await?.into()))
}

/// Edits a claim; generated identifiers are kept
pub async fn update_claim(
    State(state): State<AppState>,
    Path(id): Path<ShipmentId>,
    Json(form): Json<ClaimForm>,
) -> Result<Json<ClaimResponse>, ApiError> {
    Ok(Json(state.claims.update_claim(id, form).await?.into()))
}

pub async fn delete_claim(
    State(state): State<AppState>,
    Path(id): Path<ShipmentId>,
) -> Result<StatusCode, ApiError> {
    state.claims.delete_claim(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes every claim; clients stay
pub async fn clear_claims(
    State(state): State<AppState>,
) -> Result<Json<ClearClaimsResponse>, ApiError> {
    let removed = state.claims.clear_claims().await?;
    Ok(Json(ClearClaimsResponse { removed }))
}
