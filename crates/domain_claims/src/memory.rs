//! In-memory store
//!
//! All state sits behind one async mutex, held for the whole of every
//! write, which serializes allocation the same way the counter-row lock
//! does in PostgreSQL. Codes are allocated as `max(existing) + 1`.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use core_kernel::{
    AdapterHealth, ClientCode, ClientId, ClientReference, DomainPort, HealthCheckResult,
    HealthCheckable, PortError, SequenceKind, ShipmentId,
};

use crate::allocator::{next_after, AllocationScope};
use crate::claim::{Claim, ClaimRecord};
use crate::client::Client;
use crate::filter::ClaimFilter;
use crate::maintainer::DerivedFieldMaintainer;
use crate::ports::{ClaimStore, UserStore};
use crate::users::{NewUser, User};

#[derive(Debug, Default)]
struct MemoryState {
    clients: Vec<Client>,
    claims: Vec<Claim>,
    users: Vec<User>,
}

impl MemoryState {
    fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    fn client_named(&self, name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.has_name(name))
    }

    fn record(&self, claim: &Claim) -> Option<ClaimRecord> {
        self.client(claim.client_id).map(|client| ClaimRecord {
            claim: claim.clone(),
            client: client.clone(),
        })
    }

    fn max_sequence(&self, kind: SequenceKind) -> u64 {
        match kind {
            SequenceKind::Client => self.clients.iter().map(|c| c.client_id.sequence()).max(),
            SequenceKind::Claim => self
                .claims
                .iter()
                .filter_map(|c| c.claim_id.map(|code| code.sequence()))
                .max(),
        }
        .unwrap_or(0)
    }

    fn insert_client(&mut self, name: &str) -> Result<Client, PortError> {
        let sequence = next_after(SequenceKind::Client, self.max_sequence(SequenceKind::Client))?;
        let client = Client::new(ClientCode::from_sequence(sequence)?, name.trim(), Utc::now());
        self.clients.push(client.clone());
        Ok(client)
    }
}

struct MemoryScope<'a> {
    state: &'a MemoryState,
}

#[async_trait]
impl AllocationScope for MemoryScope<'_> {
    async fn next_sequence(&mut self, kind: SequenceKind) -> Result<u64, PortError> {
        Ok(next_after(kind, self.state.max_sequence(kind))?)
    }

    async fn client_references(
        &mut self,
        client: ClientId,
        sanitized_name: &str,
        day: NaiveDate,
    ) -> Result<Vec<String>, PortError> {
        Ok(self
            .state
            .claims
            .iter()
            .filter(|c| c.client_id == client)
            .filter_map(|c| c.client_reference.as_ref())
            .filter(|r| r.is_for(sanitized_name, day))
            .map(ClientReference::to_string)
            .collect())
    }
}

/// Store keeping everything in process memory
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    state: Mutex<MemoryState>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "memory-claim-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("In-memory store always healthy".to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn list_clients(&self) -> Result<Vec<Client>, PortError> {
        let mut clients = self.state.lock().await.clients.clone();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn count_clients(&self) -> Result<u64, PortError> {
        Ok(self.state.lock().await.clients.len() as u64)
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, PortError> {
        Ok(self.state.lock().await.client(id).cloned())
    }

    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>, PortError> {
        Ok(self.state.lock().await.client_named(name).cloned())
    }

    async fn search_clients(&self, term: &str) -> Result<Vec<Client>, PortError> {
        let state = self.state.lock().await;
        let mut found: Vec<_> = state
            .clients
            .iter()
            .filter(|c| c.name_contains(term))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn create_client(&self, name: &str) -> Result<Client, PortError> {
        self.state.lock().await.insert_client(name)
    }

    async fn get_or_create_client(&self, name: &str) -> Result<(Client, bool), PortError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.client_named(name) {
            return Ok((existing.clone(), false));
        }
        Ok((state.insert_client(name)?, true))
    }

    async fn rename_client(&self, id: ClientId, name: &str) -> Result<Option<Client>, PortError> {
        let mut state = self.state.lock().await;
        Ok(state.clients.iter_mut().find(|c| c.id == id).map(|client| {
            client.name = name.trim().to_string();
            client.clone()
        }))
    }

    async fn count_claims_for_client(&self, id: ClientId) -> Result<u64, PortError> {
        let state = self.state.lock().await;
        Ok(state.claims.iter().filter(|c| c.client_id == id).count() as u64)
    }

    async fn delete_client(&self, id: ClientId) -> Result<Option<u64>, PortError> {
        let mut state = self.state.lock().await;
        if state.client(id).is_none() {
            return Ok(None);
        }
        let before = state.claims.len();
        state.claims.retain(|c| c.client_id != id);
        let removed = (before - state.claims.len()) as u64;
        state.clients.retain(|c| c.id != id);
        Ok(Some(removed))
    }

    async fn get_claim(&self, id: ShipmentId) -> Result<Option<ClaimRecord>, PortError> {
        let state = self.state.lock().await;
        Ok(state
            .claims
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| state.record(c)))
    }

    async fn find_claim_by_number(&self, claim_no: &str) -> Result<Option<Claim>, PortError> {
        let state = self.state.lock().await;
        Ok(state.claims.iter().find(|c| c.claim_no == claim_no).cloned())
    }

    async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRecord>, PortError> {
        let state = self.state.lock().await;
        // Reverse insertion order first so equal timestamps list newest first
        let mut records: Vec<_> = state
            .claims
            .iter()
            .rev()
            .filter_map(|c| state.record(c))
            .filter(|r| filter.matches(r))
            .collect();
        records.sort_by(|a, b| b.claim.created_at.cmp(&a.claim.created_at));
        Ok(records)
    }

    async fn save_claim(
        &self,
        mut claim: Claim,
        maintainer: &DerivedFieldMaintainer,
        today: NaiveDate,
    ) -> Result<ClaimRecord, PortError> {
        let mut state = self.state.lock().await;

        let client = state
            .client(claim.client_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Client", claim.client_id))?;

        if state
            .claims
            .iter()
            .any(|c| c.claim_no == claim.claim_no && c.id != claim.id)
        {
            return Err(PortError::conflict(format!(
                "claim number {} already exists",
                claim.claim_no
            )));
        }

        {
            let mut scope = MemoryScope { state: &*state };
            maintainer.prepare(&mut claim, &client, &mut scope, today).await?;
        }

        match state.claims.iter_mut().find(|c| c.id == claim.id) {
            Some(existing) => {
                claim.created_at = existing.created_at;
                *existing = claim.clone();
            }
            None => state.claims.push(claim.clone()),
        }

        Ok(ClaimRecord { claim, client })
    }

    async fn delete_claim(&self, id: ShipmentId) -> Result<bool, PortError> {
        let mut state = self.state.lock().await;
        let before = state.claims.len();
        state.claims.retain(|c| c.id != id);
        Ok(state.claims.len() < before)
    }

    async fn clear_claims(&self) -> Result<u64, PortError> {
        let mut state = self.state.lock().await;
        let removed = state.claims.len() as u64;
        state.claims.clear();
        Ok(removed)
    }

    async fn count_claims(&self) -> Result<u64, PortError> {
        Ok(self.state.lock().await.claims.len() as u64)
    }
}

#[async_trait]
impl UserStore for InMemoryClaimStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, PortError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(PortError::conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }
        let user = user.into_user(Utc::now());
        state.users.push(user.clone());
        Ok(user)
    }
}
