//! HTTP API Layer
//!
//! This crate provides the REST API for the claims tracker using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for clients, claims, transfers, analytics and backups
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(config, store, clock);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Clock;
use domain_claims::{ClaimService, ClaimStore, DerivedFieldMaintainer, UserStore};
use infra_export::{BackupDirectory, BackupScheduler, Exporter};

use crate::config::ApiConfig;
use crate::handlers::{analytics, backups, claims, clients, health, transfer};
use crate::middleware::{audit_middleware, auth_middleware};

/// Largest accepted import upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub claims: ClaimService,
    pub users: Arc<dyn UserStore>,
    pub exporter: Exporter,
    /// Owner of the weekly backup task
    pub scheduler: Arc<BackupScheduler>,
}

impl AppState {
    /// Wires the service, exporter and backup task over one store
    pub fn new<S>(config: ApiConfig, store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: ClaimStore + UserStore,
    {
        let claim_store: Arc<dyn ClaimStore> = store.clone();
        let users: Arc<dyn UserStore> = store;

        let service = ClaimService::new(claim_store, clock)
            .with_rules(config.claim_rules())
            .with_maintainer(DerivedFieldMaintainer::new(config.zero_paid_policy()));
        let exporter = Exporter::new(service.clone(), BackupDirectory::new(&config.backup_root));
        let scheduler = Arc::new(BackupScheduler::new(exporter.clone(), config.scheduler_config()));

        Self {
            config,
            claims: service,
            users,
            exporter,
            scheduler,
        }
    }
}

/// Creates the main API router
///
/// Health and auth routes are public; everything under `/api/v1` needs a
/// bearer token and is audit-logged.
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    let client_routes = Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route("/autocomplete", get(clients::autocomplete))
        .route(
            "/:id",
            get(clients::get_client)
                .put(clients::rename_client)
                .delete(clients::delete_client),
        );

    let claim_routes = Router::new()
        .route("/", get(claims::list_claims).post(claims::create_claim))
        .route("/clear", post(claims::clear_claims))
        .route("/export", get(transfer::export_claims))
        .route(
            "/import",
            post(transfer::import_claims).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/:id",
            get(claims::get_claim)
                .put(claims::update_claim)
                .delete(claims::delete_claim),
        );

    let backup_routes = Router::new()
        .route("/", get(backups::browse_backups))
        .route("/manual", post(backups::manual_backup))
        .route(
            "/weekly-status",
            get(backups::weekly_status).post(backups::trigger_weekly_backup),
        )
        .route("/:format/:filename", get(backups::download_backup));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/clients", client_routes)
        .nest("/claims", claim_routes)
        .nest("/backups", backup_routes)
        .route("/analytics", get(analytics::get_analytics))
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
