//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the claims tracker using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: repositories own the SQL for
//! one table each, and [`PostgresClaimStore`] composes them behind the
//! domain's `ClaimStore` and `UserStore` ports.
//!
//! # Identifier allocation
//!
//! Client and claim codes come from counter rows in `id_sequences`,
//! advanced inside the transaction that stores them (see [`sequences`]).
//! Startup reconciles the counters against the stored codes.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! let store = PostgresClaimStore::new(pool);
//! store.initialize().await?;
//! ```

pub mod adapters;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod sequences;

pub use adapters::PostgresClaimStore;
pub use error::DatabaseError;
pub use migrations::run_migrations;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};
