//! Claims Domain Ports
//!
//! Port interfaces for the claims domain. Two adapters implement them:
//!
//! - **PostgreSQL adapter** (`infra_db`): counters and row locks inside a
//!   transaction
//! - **In-memory adapter** ([`crate::memory`]): a single mutex around all
//!   state, used by tests and local runs
//!
//! Lookups return `Ok(None)` for a missing row; `PortError::NotFound` is
//! reserved for references that must exist inside a write (the client of a
//! claim being saved).
//!
//! # Usage
//!
//! ```rust,ignore
//! let store: Arc<dyn ClaimStore> = Arc::new(InMemoryClaimStore::new());
//! let (client, created) = store.get_or_create_client("Acme Corp").await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{ClientId, DomainPort, HealthCheckable, PortError, ShipmentId};

use crate::claim::{Claim, ClaimRecord};
use crate::client::Client;
use crate::filter::ClaimFilter;
use crate::maintainer::DerivedFieldMaintainer;
use crate::users::{NewUser, User};

/// Persistence of clients and claims
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    // ========================================================================
    // Clients
    // ========================================================================

    /// All clients ordered by name
    async fn list_clients(&self) -> Result<Vec<Client>, PortError>;

    async fn count_clients(&self) -> Result<u64, PortError>;

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, PortError>;

    /// Case-insensitive exact name lookup; the oldest match wins
    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>, PortError>;

    /// Case-insensitive substring search, ordered by name
    async fn search_clients(&self, term: &str) -> Result<Vec<Client>, PortError>;

    /// Inserts a client, allocating its code
    async fn create_client(&self, name: &str) -> Result<Client, PortError>;

    /// Returns the client named `name` (case-insensitive), creating it when
    /// absent. The flag tells whether it was created.
    async fn get_or_create_client(&self, name: &str) -> Result<(Client, bool), PortError>;

    /// Changes the name; the code is kept
    async fn rename_client(&self, id: ClientId, name: &str) -> Result<Option<Client>, PortError>;

    async fn count_claims_for_client(&self, id: ClientId) -> Result<u64, PortError>;

    /// Removes the client and its claims, returning how many claims went
    async fn delete_client(&self, id: ClientId) -> Result<Option<u64>, PortError>;

    // ========================================================================
    // Claims
    // ========================================================================

    async fn get_claim(&self, id: ShipmentId) -> Result<Option<ClaimRecord>, PortError>;

    async fn find_claim_by_number(&self, claim_no: &str) -> Result<Option<Claim>, PortError>;

    /// Claims matching `filter`, newest first
    async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRecord>, PortError>;

    /// Inserts or updates `claim`, running `maintainer` inside the write
    ///
    /// Fails with `Conflict` when another claim holds the same `claim_no`
    /// and with `NotFound` when the client does not exist.
    async fn save_claim(
        &self,
        claim: Claim,
        maintainer: &DerivedFieldMaintainer,
        today: NaiveDate,
    ) -> Result<ClaimRecord, PortError>;

    async fn delete_claim(&self, id: ShipmentId) -> Result<bool, PortError>;

    /// Removes every claim, returning how many went
    async fn clear_claims(&self) -> Result<u64, PortError>;

    async fn count_claims(&self) -> Result<u64, PortError>;
}

/// Persistence of users
#[async_trait]
pub trait UserStore: DomainPort {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, PortError>;

    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, user: NewUser) -> Result<User, PortError>;
}
