//! Client handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use core_kernel::ClientId;
use domain_claims::ClientSuggestion;

use crate::dto::clients::*;
use crate::error::ApiError;
use crate::handlers::validate_request;
use crate::AppState;

/// Lists clients by name
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = state.claims.list_clients().await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

/// Creates a client with the next `CL` code
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<ClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    validate_request(&request)?;
    let client = state.claims.create_client(&request.name).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

/// `Name (CL00001)` suggestions for a name fragment
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<Vec<ClientSuggestion>>, ApiError> {
    Ok(Json(state.claims.autocomplete(&query.term).await?))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<ClientResponse>, ApiError> {
    Ok(Json(state.claims.get_client(id).await?.into()))
}

/// Renames a client; its code never changes
pub async fn rename_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
    Json(request): Json<ClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    validate_request(&request)?;
    Ok(Json(state.claims.rename_client(id, &request.name).await?.into()))
}

/// Deletes a client and its claims; needs `?confirm=true` when it has claims
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
    Query(query): Query<DeleteClientQuery>,
) -> Result<Json<ClientDeletionResponse>, ApiError> {
    let deletion = state.claims.delete_client(id, query.confirm).await?;
    Ok(Json(deletion.into()))
}
