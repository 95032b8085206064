//! Claims Tracker - API Server Binary
//!
//! This binary starts the HTTP API server for the claims tracker.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_TIMEZONE` - Business timezone, IANA name (default: UTC)
//! * `API_BACKUP_ROOT` - Directory holding `exports/` (default: .)
//! * `API_BACKUP_CHECK_INTERVAL_SECS` - Weekly backup check interval (default: 3600)
//! * `API_BACKUP_RETRY_INTERVAL_SECS` - Retry delay after a failed backup (default: 300)
//! * `API_WEEKLY_BACKUP_ENABLED` - Run the weekly backup task (default: true)
//! * `API_CLAIM_NO_PREFIX` - Required claim number prefix (default: S)
//! * `API_ZERO_PAID_SETTLEMENT` - `retain` or `mark_not_settled` (default: retain)

use std::net::SocketAddr;
use std::sync::Arc;

use core_kernel::SystemClock;
use infra_db::{create_pool, DatabaseConfig, PostgresClaimStore};
use interface_api::{config::ApiConfig, create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, connects and migrates the
/// database, starts the weekly backup task and serves HTTP until a
/// shutdown signal arrives.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Claims Tracker API Server"
    );

    let timezone = config.timezone()?;

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone())
            .max_connections(config.max_connections)
            .min_connections(1),
    )
    .await?;

    // Migrations, then lift the sequence counters to the stored codes
    let store = Arc::new(PostgresClaimStore::new(pool));
    store.initialize().await?;

    let state = AppState::new(config.clone(), store, Arc::new(SystemClock::new(timezone)));

    if config.weekly_backup_enabled {
        state.scheduler.start().await;
    } else {
        tracing::info!("Weekly backup task disabled");
    }

    let app = create_router(state.clone());

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.scheduler.stop().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to individual variables and defaults when the `API_`
/// environment does not deserialize.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Falling back to individual settings: {}", e);
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            jwt_secret: std::env::var("API_JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("API_DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            log_level: std::env::var("API_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            backup_root: std::env::var("API_BACKUP_ROOT").unwrap_or(defaults.backup_root),
            ..defaults
        }
    })
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
