//! Claim ("shipment") entity and its enumerations

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::money::{or_zero, shortfall, sum};
use core_kernel::{ClaimCode, ClientId, ClientReference, ShipmentId};

use crate::client::Client;

/// Workflow status set by users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Open,
    Pending,
    Closed,
    Rejected,
    UnderReview,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 5] = [
        ClaimStatus::Open,
        ClaimStatus::Pending,
        ClaimStatus::Closed,
        ClaimStatus::Rejected,
        ClaimStatus::UnderReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "OPEN",
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Closed => "CLOSED",
            ClaimStatus::Rejected => "REJECTED",
            ClaimStatus::UnderReview => "UNDER_REVIEW",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "Open",
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Closed => "Closed",
            ClaimStatus::Rejected => "Rejected",
            ClaimStatus::UnderReview => "Under Review",
        }
    }

    /// Case-insensitive parse of the stored code
    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.trim().to_uppercase();
        Self::ALL.into_iter().find(|s| s.as_str() == upper)
    }
}

impl Default for ClaimStatus {
    fn default() -> Self {
        ClaimStatus::Open
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement status derived from the payment fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Settled,
    NotSettled,
    Partial,
}

impl SettlementStatus {
    pub const ALL: [SettlementStatus; 3] = [
        SettlementStatus::Settled,
        SettlementStatus::NotSettled,
        SettlementStatus::Partial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Settled => "SETTLED",
            SettlementStatus::NotSettled => "NOT_SETTLED",
            SettlementStatus::Partial => "PARTIAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettlementStatus::Settled => "Settled",
            SettlementStatus::NotSettled => "Not Settled",
            SettlementStatus::Partial => "Partially Settled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.trim().to_uppercase();
        Self::ALL.into_iter().find(|s| s.as_str() == upper)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Branch {
    Atl,
    Cmu,
    Con,
    Dor,
    Hec,
    Hnl,
    Hou,
    Ics,
    Imp,
    Jfk,
    Lax,
    Lcl,
    Ord,
    Ppg,
}

impl Branch {
    pub const ALL: [Branch; 14] = [
        Branch::Atl,
        Branch::Cmu,
        Branch::Con,
        Branch::Dor,
        Branch::Hec,
        Branch::Hnl,
        Branch::Hou,
        Branch::Ics,
        Branch::Imp,
        Branch::Jfk,
        Branch::Lax,
        Branch::Lcl,
        Branch::Ord,
        Branch::Ppg,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Branch::Atl => "ATL",
            Branch::Cmu => "CMU",
            Branch::Con => "CON",
            Branch::Dor => "DOR",
            Branch::Hec => "HEC",
            Branch::Hnl => "HNL",
            Branch::Hou => "HOU",
            Branch::Ics => "ICS",
            Branch::Imp => "IMP",
            Branch::Jfk => "JFK",
            Branch::Lax => "LAX",
            Branch::Lcl => "LCL",
            Branch::Ord => "ORD",
            Branch::Ppg => "PPG",
        }
    }

    /// Exact match on the three-letter code, surrounding whitespace ignored
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|b| b.code() == trimmed)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A claim recorded against a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Internal identity
    pub id: ShipmentId,
    /// User-supplied shipment number, unique
    pub claim_no: String,
    /// Generated `CLM` code
    pub claim_id: Option<ClaimCode>,
    /// Generated per-client-per-day reference
    pub client_reference: Option<ClientReference>,
    /// Owning client
    pub client_id: ClientId,
    pub branch: Option<Branch>,
    pub brand: Option<String>,
    pub claimant: Option<String>,
    pub intent_to_claim: Option<bool>,
    pub intent_date: Option<NaiveDate>,
    pub formal_claim_received: Option<bool>,
    pub formal_claim_date: Option<NaiveDate>,
    /// Claimed value
    pub claimed_amount: Option<Decimal>,
    pub paid_by_carrier: Option<Decimal>,
    /// Paid by the intermediary (ISCM/AWA)
    pub paid_by_intermediary: Option<Decimal>,
    pub paid_by_insurer: Option<Decimal>,
    pub total_savings: Option<Decimal>,
    pub financial_exposure: Option<Decimal>,
    pub settlement_status: Option<SettlementStatus>,
    pub status: ClaimStatus,
    pub closed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Creates an unsaved claim with no generated identifiers
    pub fn new(claim_no: impl Into<String>, client_id: ClientId, now: DateTime<Utc>) -> Self {
        Self {
            id: ShipmentId::new_v7(),
            claim_no: claim_no.into(),
            claim_id: None,
            client_reference: None,
            client_id,
            branch: None,
            brand: None,
            claimant: None,
            intent_to_claim: None,
            intent_date: None,
            formal_claim_received: None,
            formal_claim_date: None,
            claimed_amount: None,
            paid_by_carrier: None,
            paid_by_intermediary: None,
            paid_by_insurer: None,
            total_savings: None,
            financial_exposure: None,
            settlement_status: None,
            status: ClaimStatus::Open,
            closed_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Carrier + intermediary + insurer, missing values as zero
    pub fn total_amount_paid(&self) -> Decimal {
        sum([
            self.paid_by_carrier,
            self.paid_by_intermediary,
            self.paid_by_insurer,
        ])
    }

    /// `max(0, claimed - paid)`
    pub fn outstanding_amount(&self) -> Decimal {
        shortfall(or_zero(self.claimed_amount), self.total_amount_paid())
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// A claim together with its client, as listed and exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim: Claim,
    pub client: Client,
}

/// User-submitted claim fields
///
/// `branch` and `status` arrive as raw codes so validation can report them
/// per field. Fields a form may leave out on edit (`brand`, `claimant`,
/// `intent_to_claim`, `total_savings`, `financial_exposure`, `status`) keep
/// their stored value when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimForm {
    pub claim_no: String,
    pub client_name: String,
    pub branch: Option<String>,
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
    pub total_savings: Option<Decimal>,
    pub financial_exposure: Option<Decimal>,
    pub status: Option<String>,
    pub closed_date: Option<NaiveDate>,
}

impl ClaimForm {
    /// Copies the submitted fields onto `claim`
    ///
    /// Generated identifiers and the settlement status are left alone.
    pub fn apply_to(&self, claim: &mut Claim) {
        claim.claim_no = self.claim_no.trim().to_string();
        claim.branch = self.branch.as_deref().and_then(Branch::parse);
        claim.brand = non_blank(self.brand.as_deref()).or_else(|| claim.brand.take());
        claim.claimant = non_blank(self.claimant.as_deref()).or_else(|| claim.claimant.take());
        claim.intent_to_claim = self.intent_to_claim.or(claim.intent_to_claim);
        claim.intent_date = self.intent_date;
        claim.formal_claim_received = self.formal_claim_received;
        claim.formal_claim_date = self.formal_claim_date;
        claim.claimed_amount = self.claimed_amount;
        claim.paid_by_carrier = self.paid_by_carrier;
        claim.paid_by_intermediary = self.paid_by_intermediary;
        claim.paid_by_insurer = self.paid_by_insurer;
        claim.total_savings = self.total_savings.or(claim.total_savings);
        claim.financial_exposure = self.financial_exposure.or(claim.financial_exposure);
        if let Some(status) = self.status.as_deref().and_then(ClaimStatus::parse) {
            claim.status = status;
        }
        claim.closed_date = self.closed_date;
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_paid_and_outstanding() {
        let mut claim = Claim::new("S100", ClientId::new_v7(), Utc::now());
        claim.claimed_amount = Some(dec!(500));
        claim.paid_by_carrier = Some(dec!(200));
        claim.paid_by_insurer = Some(dec!(50));
        assert_eq!(claim.total_amount_paid(), dec!(250));
        assert_eq!(claim.outstanding_amount(), dec!(250));

        claim.paid_by_intermediary = Some(dec!(400));
        assert_eq!(claim.outstanding_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ClaimStatus::parse("under_review"), Some(ClaimStatus::UnderReview));
        assert_eq!(ClaimStatus::parse("lost"), None);
        assert_eq!(Branch::parse(" JFK "), Some(Branch::Jfk));
        assert_eq!(Branch::parse("XYZ"), None);
    }
}
