//! Client DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClientCode, ClientId};
use domain_claims::{Client, ClientDeletion};

#[derive(Debug, Deserialize, Validate)]
pub struct ClientRequest {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AutocompleteQuery {
    pub term: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteClientQuery {
    pub confirm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: ClientId,
    pub client_id: ClientCode,
    pub name: String,
    /// `Name (CL00001)`
    pub label: String,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            label: client.label(),
            id: client.id,
            client_id: client.client_id,
            name: client.name,
            created_at: client.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientDeletionResponse {
    pub client: ClientResponse,
    pub claims_removed: u64,
}

impl From<ClientDeletion> for ClientDeletionResponse {
    fn from(deletion: ClientDeletion) -> Self {
        Self {
            client: deletion.client.into(),
            claims_removed: deletion.claims_removed,
        }
    }
}
