//! Claim list filters
//!
//! Shared by the list endpoint, every export and the in-memory store.
//! Blank strings count as "not filtering".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::ClientId;

use crate::claim::ClaimRecord;

/// How the `client` filter selects clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSelector {
    /// Internal identity
    Id(ClientId),
    /// Case-insensitive substring of the name
    NameContains(String),
}

/// Query parameters for listing claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimFilter {
    /// Substring of `claim_no` or `claim_id`, case-insensitive
    pub claim_no: Option<String>,
    /// Client identity, else name substring
    pub client: Option<String>,
    /// Exact client code (`CL00001`)
    pub client_unique_id: Option<String>,
    /// Exact branch code
    pub branch: Option<String>,
    pub intent_date_from: Option<NaiveDate>,
    pub intent_date_to: Option<NaiveDate>,
    pub formal_date_from: Option<NaiveDate>,
    pub formal_date_to: Option<NaiveDate>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ClaimFilter {
    pub fn claim_no_term(&self) -> Option<&str> {
        present(&self.claim_no)
    }

    pub fn client_unique_id_term(&self) -> Option<&str> {
        present(&self.client_unique_id)
    }

    pub fn branch_term(&self) -> Option<&str> {
        present(&self.branch)
    }

    pub fn client_selector(&self) -> Option<ClientSelector> {
        present(&self.client).map(|term| match term.parse::<ClientId>() {
            Ok(id) => ClientSelector::Id(id),
            Err(_) => ClientSelector::NameContains(term.to_string()),
        })
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.claim_no_term().is_none()
            && self.client_selector().is_none()
            && self.client_unique_id_term().is_none()
            && self.branch_term().is_none()
            && self.intent_date_from.is_none()
            && self.intent_date_to.is_none()
            && self.formal_date_from.is_none()
            && self.formal_date_to.is_none()
    }

    /// Evaluates the filter against one record
    pub fn matches(&self, record: &ClaimRecord) -> bool {
        let claim = &record.claim;

        if let Some(term) = self.claim_no_term() {
            let term = term.to_lowercase();
            let in_claim_no = claim.claim_no.to_lowercase().contains(&term);
            let in_claim_id = claim
                .claim_id
                .map(|code| code.to_string().to_lowercase().contains(&term))
                .unwrap_or(false);
            if !in_claim_no && !in_claim_id {
                return false;
            }
        }

        match self.client_selector() {
            Some(ClientSelector::Id(id)) if record.client.id != id => return false,
            Some(ClientSelector::NameContains(term)) if !record.client.name_contains(&term) => {
                return false
            }
            _ => {}
        }

        if let Some(code) = self.client_unique_id_term() {
            if record.client.client_id.to_string() != code {
                return false;
            }
        }

        if let Some(branch) = self.branch_term() {
            if claim.branch.map(|b| b.code()) != Some(branch) {
                return false;
            }
        }

        within(claim.intent_date, self.intent_date_from, self.intent_date_to)
            && within(claim.formal_claim_date, self.formal_date_from, self.formal_date_to)
    }
}

fn within(date: Option<NaiveDate>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    match date {
        None => false,
        Some(d) => from.map_or(true, |f| d >= f) && to.map_or(true, |t| d <= t),
    }
}
