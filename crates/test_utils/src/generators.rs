//! Property-Based Test Generators
//!
//! Proptest strategies for claim data, plus `fake`-backed helpers for
//! realistic client names.

use chrono::{Duration, NaiveDate};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::{Branch, ClaimStatus};

/// Strategy for claim numbers carrying the default `S` prefix
pub fn claim_no_strategy() -> impl Strategy<Value = String> {
    (1u32..10_000_000u32).prop_map(|n| format!("S{}", n))
}

/// Strategy for non-negative amounts in cents, up to $10M
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a claimed amount and payments that never exceed it
pub fn claimed_and_paid_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..1_000_000_000i64)
        .prop_flat_map(|claimed| (Just(claimed), 0i64..=claimed))
        .prop_map(|(claimed, paid)| (Decimal::new(claimed, 2), Decimal::new(paid, 2)))
}

/// Strategy for branch codes
pub fn branch_strategy() -> impl Strategy<Value = Branch> {
    proptest::sample::select(Branch::ALL.to_vec())
}

/// Strategy for workflow statuses
pub fn status_strategy() -> impl Strategy<Value = ClaimStatus> {
    proptest::sample::select(ClaimStatus::ALL.to_vec())
}

/// Strategy for dates within 2024 and 2025
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..730i64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Strategy for client names, including punctuation the references strip
pub fn client_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,12}( [A-Z][a-z]{1,10})?( (Inc\\.|LLC|& Co\\.))?"
}

/// A realistic company name
pub fn fake_client_name() -> String {
    CompanyName().fake()
}

/// `count` distinct company names
pub fn fake_client_names(count: usize) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(count);
    while names.len() < count {
        let name = fake_client_name();
        if !names.iter().any(|existing| existing.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    }
    names
}
