//! Repository implementations
//!
//! Each repository owns the SQL for one table and maps between database
//! rows and domain types. Queries are built at runtime with
//! `sqlx::query_as` and `QueryBuilder`; row structs derive `FromRow`.

pub mod claims;
pub mod clients;
pub mod users;

pub use claims::{ClaimRepository, ClaimRow};
pub use clients::{ClientRepository, ClientRow};
pub use users::{UserRepository, UserRow};
