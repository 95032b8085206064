//! Test Data Builders
//!
//! Builder patterns for claim forms and stored claims. Tests specify only
//! the fields they care about and take fixture defaults for the rest.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use core_kernel::{ClaimCode, ClientReference};
use domain_claims::{
    Branch, Claim, ClaimForm, ClaimRecord, ClaimStatus, Client, SettlementStatus,
};

use crate::fixtures::{ClientFixtures, TemporalFixtures};

/// Builder for claim submissions
#[derive(Debug, Clone)]
pub struct ClaimFormBuilder {
    form: ClaimForm,
}

impl ClaimFormBuilder {
    /// Starts from a valid form for `claim_no` under `client`
    pub fn new(claim_no: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            form: ClaimForm {
                claim_no: claim_no.into(),
                client_name: client.into(),
                branch: Some(Branch::Atl.code().to_string()),
                intent_date: Some(TemporalFixtures::business_day()),
                ..Default::default()
            },
        }
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.form.branch = Some(branch.code().to_string());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.form.brand = Some(brand.into());
        self
    }

    pub fn with_claimant(mut self, claimant: impl Into<String>) -> Self {
        self.form.claimant = Some(claimant.into());
        self
    }

    pub fn with_intent_date(mut self, date: NaiveDate) -> Self {
        self.form.intent_to_claim = Some(true);
        self.form.intent_date = Some(date);
        self
    }

    /// Marks the formal claim as received on `date`
    pub fn with_formal_claim(mut self, date: NaiveDate) -> Self {
        self.form.formal_claim_received = Some(true);
        self.form.formal_claim_date = Some(date);
        self
    }

    pub fn with_claimed(mut self, amount: Decimal) -> Self {
        self.form.claimed_amount = Some(amount);
        self
    }

    /// Sets carrier, intermediary and insurer payments
    pub fn with_payments(mut self, carrier: Decimal, intermediary: Decimal, insurer: Decimal) -> Self {
        self.form.paid_by_carrier = Some(carrier);
        self.form.paid_by_intermediary = Some(intermediary);
        self.form.paid_by_insurer = Some(insurer);
        self
    }

    pub fn with_savings(mut self, savings: Decimal) -> Self {
        self.form.total_savings = Some(savings);
        self
    }

    pub fn with_exposure(mut self, exposure: Decimal) -> Self {
        self.form.financial_exposure = Some(exposure);
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.form.status = Some(status.as_str().to_string());
        self
    }

    pub fn closed_on(mut self, date: NaiveDate) -> Self {
        self.form.status = Some(ClaimStatus::Closed.as_str().to_string());
        self.form.closed_date = Some(date);
        self
    }

    pub fn build(self) -> ClaimForm {
        self.form
    }
}

/// Builder for stored claims, bypassing the service
#[derive(Debug, Clone)]
pub struct ClaimRecordBuilder {
    claim: Claim,
    client: Client,
}

impl ClaimRecordBuilder {
    /// A claim for the Acme fixture client, created at business noon
    pub fn new(claim_no: impl Into<String>) -> Self {
        let client = ClientFixtures::acme();
        let mut claim = Claim::new(claim_no, client.id, TemporalFixtures::business_noon());
        claim.branch = Some(Branch::Atl);
        claim.intent_date = Some(TemporalFixtures::business_day());
        Self { claim, client }
    }

    /// Moves the claim to `client`
    pub fn for_client(mut self, client: Client) -> Self {
        self.claim.client_id = client.id;
        self.client = client;
        self
    }

    /// Sets the generated identifiers as if allocated on `day`
    pub fn with_identifiers(mut self, sequence: u64, reference_number: u32, day: NaiveDate) -> Self {
        self.claim.claim_id = ClaimCode::from_sequence(sequence).ok();
        self.claim.client_reference = Some(ClientReference::new(
            core_kernel::sanitize_client_name(&self.client.name),
            reference_number,
            day,
        ));
        self
    }

    pub fn with_branch(mut self, branch: Option<Branch>) -> Self {
        self.claim.branch = branch;
        self
    }

    pub fn with_claimant(mut self, claimant: impl Into<String>) -> Self {
        self.claim.claimant = Some(claimant.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.claim.brand = Some(brand.into());
        self
    }

    pub fn with_intent(mut self, date: NaiveDate) -> Self {
        self.claim.intent_to_claim = Some(true);
        self.claim.intent_date = Some(date);
        self
    }

    pub fn with_formal(mut self, date: NaiveDate) -> Self {
        self.claim.formal_claim_received = Some(true);
        self.claim.formal_claim_date = Some(date);
        self
    }

    /// Sets the claimed value and the carrier payment
    pub fn with_amounts(mut self, claimed: Decimal, paid_by_carrier: Decimal) -> Self {
        self.claim.claimed_amount = Some(claimed);
        self.claim.paid_by_carrier = Some(paid_by_carrier);
        self
    }

    pub fn with_settlement(mut self, settlement: SettlementStatus) -> Self {
        self.claim.settlement_status = Some(settlement);
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.claim.status = status;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.claim.created_at = at;
        self.claim.updated_at = at;
        self
    }

    pub fn build(self) -> ClaimRecord {
        ClaimRecord {
            claim: self.claim,
            client: self.client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_form_builder_defaults_are_valid_shape() {
        let form = ClaimFormBuilder::new("S1", "Acme").build();
        assert_eq!(form.branch.as_deref(), Some("ATL"));
        assert_eq!(form.intent_date, Some(TemporalFixtures::business_day()));
        assert!(form.status.is_none());
    }

    #[test]
    fn test_form_builder_sets_payments() {
        let form = ClaimFormBuilder::new("S1", "Acme")
            .with_claimed(dec!(900))
            .with_payments(dec!(100), dec!(200), dec!(300))
            .closed_on(TemporalFixtures::next_day())
            .build();
        assert_eq!(form.paid_by_intermediary, Some(dec!(200)));
        assert_eq!(form.status.as_deref(), Some("CLOSED"));
    }

    #[test]
    fn test_record_builder_follows_client() {
        let beta = ClientFixtures::beta();
        let record = ClaimRecordBuilder::new("S9")
            .for_client(beta.clone())
            .with_identifiers(7, 2, TemporalFixtures::business_day())
            .build();
        assert_eq!(record.claim.client_id, beta.id);
        assert_eq!(record.claim.claim_id.unwrap().to_string(), "CLM000007");
        assert_eq!(
            record.claim.client_reference.unwrap().to_string(),
            "BetaLLC-2-20250601"
        );
    }
}
