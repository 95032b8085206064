//! PostgreSQL Claims Adapter
//!
//! Implements [`ClaimStore`] and [`UserStore`] on top of the repositories.
//!
//! # Allocation
//!
//! `save_claim` runs in one transaction:
//!
//! 1. lock the client row (`FOR UPDATE`), serializing references per client
//! 2. reject a `claim_no` held by another claim
//! 3. run the derived-field maintainer, whose claim code comes from the
//!    `id_sequences` counter row, locked until commit
//! 4. upsert the claim
//!
//! A failure at any step rolls the whole write back, counter included.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    ClientCode, ClientId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
    SequenceKind, ShipmentId,
};
use domain_claims::{
    AllocationScope, Claim, ClaimFilter, ClaimRecord, ClaimStore, Client, DerivedFieldMaintainer,
    NewUser, User, UserStore,
};

use crate::error::DatabaseError;
use crate::migrations::run_migrations;
use crate::repositories::{ClaimRepository, ClientRepository, ClientRow, UserRepository};
use crate::sequences;

const ADAPTER_ID: &str = "postgres-claim-store";

/// Allocation scope bound to an open transaction
struct PgScope<'a> {
    conn: &'a mut PgConnection,
}

#[async_trait]
impl AllocationScope for PgScope<'_> {
    async fn next_sequence(&mut self, kind: SequenceKind) -> Result<u64, PortError> {
        Ok(sequences::next_value(&mut *self.conn, kind).await?)
    }

    async fn client_references(
        &mut self,
        client: ClientId,
        sanitized_name: &str,
        day: NaiveDate,
    ) -> Result<Vec<String>, PortError> {
        Ok(ClaimRepository::references_for(&mut *self.conn, *client.as_uuid(), sanitized_name, day).await?)
    }
}

fn to_clients(rows: Vec<ClientRow>) -> Result<Vec<Client>, PortError> {
    rows.into_iter()
        .map(|row| Client::try_from(row).map_err(PortError::from))
        .collect()
}

/// PostgreSQL-backed claim and user store
#[derive(Debug, Clone)]
pub struct PostgresClaimStore {
    clients: ClientRepository,
    claims: ClaimRepository,
    users: UserRepository,
    pool: PgPool,
}

impl PostgresClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool.clone()),
            claims: ClaimRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Applies migrations and lifts the sequence counters to the stored codes
    ///
    /// Fails when a stored code does not parse; the store must not serve
    /// writes in that state.
    pub async fn initialize(&self) -> Result<(), DatabaseError> {
        run_migrations(&self.pool).await?;
        sequences::reconcile(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_client(conn: &mut PgConnection, name: &str) -> Result<ClientRow, DatabaseError> {
        let sequence = sequences::next_value(&mut *conn, SequenceKind::Client).await?;
        let code = ClientCode::from_sequence(sequence)?;
        let row = ClientRow {
            id: Uuid::now_v7(),
            client_id: code.to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };
        ClientRepository::insert(conn, &row).await
    }
}

impl DomainPort for PostgresClaimStore {}

#[async_trait]
impl HealthCheckable for PostgresClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl ClaimStore for PostgresClaimStore {
    async fn list_clients(&self) -> Result<Vec<Client>, PortError> {
        to_clients(self.clients.list().await?)
    }

    async fn count_clients(&self) -> Result<u64, PortError> {
        Ok(self.clients.count().await? as u64)
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, PortError> {
        match self.clients.get(*id.as_uuid()).await? {
            Some(row) => Ok(Some(Client::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>, PortError> {
        match self.clients.find_by_name(name).await? {
            Some(row) => Ok(Some(Client::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn search_clients(&self, term: &str) -> Result<Vec<Client>, PortError> {
        to_clients(self.clients.search(term).await?)
    }

    #[instrument(skip(self))]
    async fn create_client(&self, name: &str) -> Result<Client, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        let row = Self::insert_client(&mut *tx, name).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(Client::try_from(row)?)
    }

    #[instrument(skip(self))]
    async fn get_or_create_client(&self, name: &str) -> Result<(Client, bool), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        // Two writers racing on the same new name queue here
        sequences::lock(&mut *tx, SequenceKind::Client).await?;

        if let Some(existing) = ClientRepository::find_by_name_in(&mut *tx, name).await? {
            tx.commit().await.map_err(DatabaseError::from)?;
            return Ok((Client::try_from(existing)?, false));
        }

        let row = Self::insert_client(&mut *tx, name).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        debug!(client_id = %row.client_id, "Client created on demand");
        Ok((Client::try_from(row)?, true))
    }

    async fn rename_client(&self, id: ClientId, name: &str) -> Result<Option<Client>, PortError> {
        match self.clients.rename(*id.as_uuid(), name.trim()).await? {
            Some(row) => Ok(Some(Client::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn count_claims_for_client(&self, id: ClientId) -> Result<u64, PortError> {
        Ok(self.claims.count_for_client(*id.as_uuid()).await? as u64)
    }

    async fn delete_client(&self, id: ClientId) -> Result<Option<u64>, PortError> {
        Ok(self.clients.delete(*id.as_uuid()).await?)
    }

    async fn get_claim(&self, id: ShipmentId) -> Result<Option<ClaimRecord>, PortError> {
        match self.claims.get(*id.as_uuid()).await? {
            Some(row) => Ok(Some(ClaimRecord::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn find_claim_by_number(&self, claim_no: &str) -> Result<Option<Claim>, PortError> {
        match self.claims.find_by_number(claim_no).await? {
            Some(row) => Ok(Some(ClaimRecord::try_from(row)?.claim)),
            None => Ok(None),
        }
    }

    async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRecord>, PortError> {
        self.claims
            .list(filter)
            .await?
            .into_iter()
            .map(|row| ClaimRecord::try_from(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, claim, maintainer), fields(claim_no = %claim.claim_no))]
    async fn save_claim(
        &self,
        mut claim: Claim,
        maintainer: &DerivedFieldMaintainer,
        today: NaiveDate,
    ) -> Result<ClaimRecord, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let client_row = ClientRepository::lock(&mut *tx, *claim.client_id.as_uuid())
            .await?
            .ok_or_else(|| PortError::not_found("Client", claim.client_id))?;
        let client = Client::try_from(client_row)?;

        if ClaimRepository::number_taken(&mut *tx, &claim.claim_no, *claim.id.as_uuid())
            .await?
            .is_some()
        {
            return Err(PortError::conflict(format!(
                "claim number {} already exists",
                claim.claim_no
            )));
        }

        {
            let mut scope = PgScope { conn: &mut *tx };
            maintainer.prepare(&mut claim, &client, &mut scope, today).await?;
        }

        claim.created_at = ClaimRepository::upsert(&mut *tx, &claim).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(ClaimRecord { claim, client })
    }

    async fn delete_claim(&self, id: ShipmentId) -> Result<bool, PortError> {
        Ok(self.claims.delete(*id.as_uuid()).await?)
    }

    async fn clear_claims(&self) -> Result<u64, PortError> {
        Ok(self.claims.delete_all().await?)
    }

    async fn count_claims(&self) -> Result<u64, PortError> {
        Ok(self.claims.count().await? as u64)
    }
}

#[async_trait]
impl UserStore for PostgresClaimStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
        Ok(self.users.find_by_username(username).await?.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, PortError> {
        let user = user.into_user(Utc::now());
        Ok(self.users.insert(&user).await?.into())
    }
}
