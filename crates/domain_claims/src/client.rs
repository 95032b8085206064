//! Client entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{sanitize_client_name, ClientCode, ClientId};

/// A client that claims are recorded against
///
/// Names are not unique; lookups used for deduplication compare them
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Internal identity
    pub id: ClientId,
    /// Human-readable code, assigned once at first persistence
    pub client_id: ClientCode,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn new(client_id: ClientCode, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ClientId::new_v7(),
            client_id,
            name: name.into(),
            created_at,
        }
    }

    /// `Name (CL00001)`, as shown in pickers
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.client_id)
    }

    /// Name segment used in client references
    pub fn reference_name(&self) -> String {
        sanitize_client_name(&self.name)
    }

    /// Case-insensitive name equality
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Case-insensitive substring match on the name
    pub fn name_contains(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Trims a submitted client name, rejecting blank input
pub fn normalize_client_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Autocomplete entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSuggestion {
    pub id: ClientId,
    pub text: String,
}

impl From<&Client> for ClientSuggestion {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            text: client.label(),
        }
    }
}
