//! Domain Adapters
//!
//! Adapter implementations of the claims domain ports, translating between
//! domain models and repository rows and turning database errors into
//! port errors.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClaimStore;
//! use domain_claims::ClaimStore;
//!
//! let store = PostgresClaimStore::new(pool);
//! store.initialize().await?;
//! let store: Arc<dyn ClaimStore> = Arc::new(store);
//! ```

pub mod claims;

pub use claims::PostgresClaimStore;
