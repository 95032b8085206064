//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Store probe, readiness only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<HealthCheckResult>,
}

impl HealthResponse {
    fn new(status: &str, store: Option<HealthCheckResult>) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
        }
    }
}

/// Process is up
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", None))
}

/// Process is up and the claim store answers
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe = state.claims.store().health_check().await;
    if probe.status == AdapterHealth::Unhealthy {
        tracing::warn!(adapter = %probe.adapter_id, message = ?probe.message, "Store not ready");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("unavailable", Some(probe))),
        );
    }
    (StatusCode::OK, Json(HealthResponse::new("ready", Some(probe))))
}
