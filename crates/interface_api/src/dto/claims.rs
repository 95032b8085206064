//! Claims DTOs
//!
//! Requests use [`domain_claims::ClaimForm`] directly.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimCode, ShipmentId};
use domain_claims::{Branch, ClaimRecord, ClaimStatus, CreatedClaim, SettlementStatus};

use crate::dto::clients::ClientResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: ShipmentId,
    pub claim_no: String,
    pub claim_id: Option<ClaimCode>,
    pub client_reference: Option<String>,
    pub client: ClientResponse,
    pub branch: Option<Branch>,
    pub brand: Option<String>,
    pub claimant: Option<String>,
    pub intent_to_claim: Option<bool>,
    pub intent_date: Option<NaiveDate>,
    pub formal_claim_received: Option<bool>,
    pub formal_claim_date: Option<NaiveDate>,
    pub claimed_amount: Option<Decimal>,
    pub paid_by_carrier: Option<Decimal>,
    pub paid_by_intermediary: Option<Decimal>,
    pub paid_by_insurer: Option<Decimal>,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    pub total_savings: Option<Decimal>,
    pub financial_exposure: Option<Decimal>,
    pub settlement_status: Option<SettlementStatus>,
    pub status: ClaimStatus,
    pub closed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClaimRecord> for ClaimResponse {
    fn from(record: ClaimRecord) -> Self {
        let ClaimRecord { claim, client } = record;
        Self {
            total_paid: claim.total_amount_paid(),
            outstanding: claim.outstanding_amount(),
            id: claim.id,
            claim_no: claim.claim_no,
            claim_id: claim.claim_id,
            client_reference: claim.client_reference.map(|r| r.to_string()),
            client: client.into(),
            branch: claim.branch,
            brand: claim.brand,
            claimant: claim.claimant,
            intent_to_claim: claim.intent_to_claim,
            intent_date: claim.intent_date,
            formal_claim_received: claim.formal_claim_received,
            formal_claim_date: claim.formal_claim_date,
            claimed_amount: claim.claimed_amount,
            paid_by_carrier: claim.paid_by_carrier,
            paid_by_intermediary: claim.paid_by_intermediary,
            paid_by_insurer: claim.paid_by_insurer,
            total_savings: claim.total_savings,
            financial_exposure: claim.financial_exposure,
            settlement_status: claim.settlement_status,
            status: claim.status,
            closed_date: claim.closed_date,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedClaimResponse {
    pub claim: ClaimResponse,
    pub client_created: bool,
}

impl From<CreatedClaim> for CreatedClaimResponse {
    fn from(created: CreatedClaim) -> Self {
        Self {
            claim: created.record.into(),
            client_created: created.client_created,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportQuery {
    /// `excel` (default), `csv` or `pdf`
    pub format: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearClaimsResponse {
    pub removed: u64,
}
