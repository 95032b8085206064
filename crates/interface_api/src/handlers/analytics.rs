//! Analytics handler

use axum::{extract::State, Json};

use domain_claims::AnalyticsReport;

use crate::error::ApiError;
use crate::AppState;

/// Dashboard aggregates over every claim
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    Ok(Json(state.claims.analytics().await?))
}
