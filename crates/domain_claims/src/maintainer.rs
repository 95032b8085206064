//! Derived-field maintenance
//!
//! Runs at every persistence of a claim, inside the write, in this order:
//!
//! 1. assign `claim_id` when missing
//! 2. assign `client_reference` when missing
//! 3. derive `total_savings` when unset and something was claimed
//! 4. derive `settlement_status` from claimed vs. paid

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::money::{or_zero, shortfall};
use core_kernel::{ClaimCode, PortError, SequenceKind};

use crate::allocator::{next_client_reference, AllocationScope};
use crate::claim::{Claim, SettlementStatus};
use crate::client::Client;

/// Settlement handling when a claim has a claimed amount but nothing paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPaidPolicy {
    /// Keep whatever status the claim already had
    #[default]
    Retain,
    /// Set `NOT_SETTLED`
    MarkNotSettled,
}

impl FromStr for ZeroPaidPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" => Ok(ZeroPaidPolicy::Retain),
            "mark_not_settled" | "not_settled" => Ok(ZeroPaidPolicy::MarkNotSettled),
            other => Err(format!("unknown zero-paid policy '{}'", other)),
        }
    }
}

/// Recomputes generated and derived claim fields
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedFieldMaintainer {
    pub zero_paid: ZeroPaidPolicy,
}

impl DerivedFieldMaintainer {
    pub fn new(zero_paid: ZeroPaidPolicy) -> Self {
        Self { zero_paid }
    }

    /// Runs every step against an open allocation scope
    ///
    /// Identifiers already present are never replaced.
    pub async fn prepare<S>(
        &self,
        claim: &mut Claim,
        client: &Client,
        scope: &mut S,
        today: NaiveDate,
    ) -> Result<(), PortError>
    where
        S: AllocationScope + ?Sized,
    {
        if claim.claim_id.is_none() {
            let sequence = scope.next_sequence(SequenceKind::Claim).await?;
            claim.claim_id = Some(ClaimCode::from_sequence(sequence)?);
        }

        if claim.client_reference.is_none() {
            let sanitized = client.reference_name();
            let existing = scope.client_references(client.id, &sanitized, today).await?;
            let reference =
                next_client_reference(&client.name, existing.iter().map(String::as_str), today);
            tracing::debug!(claim_no = %claim.claim_no, reference = %reference, "Assigned client reference");
            claim.client_reference = Some(reference);
        }

        self.apply_amount_rules(claim);
        Ok(())
    }

    /// Steps 3 and 4, which need no store
    pub fn apply_amount_rules(&self, claim: &mut Claim) {
        let claimed = or_zero(claim.claimed_amount);
        let paid = claim.total_amount_paid();

        if claim.total_savings.is_none() && claimed > Decimal::ZERO {
            claim.total_savings = Some(shortfall(claimed, paid));
        }

        if let Some(status) = self.settlement_for(claimed, paid) {
            claim.settlement_status = Some(status);
        }
    }

    /// Status implied by the amounts, `None` when the stored one stays
    pub fn settlement_for(&self, claimed: Decimal, paid: Decimal) -> Option<SettlementStatus> {
        if claimed.is_zero() {
            return None;
        }
        if paid.is_zero() {
            return match self.zero_paid {
                ZeroPaidPolicy::Retain => None,
                ZeroPaidPolicy::MarkNotSettled => Some(SettlementStatus::NotSettled),
            };
        }
        if paid >= claimed {
            Some(SettlementStatus::Settled)
        } else if paid > Decimal::ZERO {
            Some(SettlementStatus::Partial)
        } else {
            Some(SettlementStatus::NotSettled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settlement_rules() {
        let maintainer = DerivedFieldMaintainer::default();
        assert_eq!(maintainer.settlement_for(dec!(1000), dec!(1000)), Some(SettlementStatus::Settled));
        assert_eq!(maintainer.settlement_for(dec!(500), dec!(200)), Some(SettlementStatus::Partial));
        assert_eq!(maintainer.settlement_for(dec!(500), dec!(0)), None);
        assert_eq!(maintainer.settlement_for(dec!(0), dec!(10)), None);

        let strict = DerivedFieldMaintainer::new(ZeroPaidPolicy::MarkNotSettled);
        assert_eq!(strict.settlement_for(dec!(500), dec!(0)), Some(SettlementStatus::NotSettled));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("retain".parse::<ZeroPaidPolicy>(), Ok(ZeroPaidPolicy::Retain));
        assert_eq!("MARK_NOT_SETTLED".parse::<ZeroPaidPolicy>(), Ok(ZeroPaidPolicy::MarkNotSettled));
        assert!("sometimes".parse::<ZeroPaidPolicy>().is_err());
    }
}
