//! Custom Test Assertions
//!
//! Assertion helpers for claims and import reports that give more
//! meaningful failure messages than bare `assert_eq!`.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use domain_claims::{ClaimRecord, ImportReport, SettlementStatus};

/// Asserts two amounts are equal after rounding to cents
pub fn assert_amount_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.round_dp(2),
        expected.round_dp(2),
        "Amounts differ: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts the generated `CLM` code has the given sequence number
pub fn assert_claim_code(record: &ClaimRecord, sequence: u64) {
    let code = record
        .claim
        .claim_id
        .unwrap_or_else(|| panic!("Claim {} has no claim ID", record.claim.claim_no));
    assert_eq!(
        code.sequence(),
        sequence,
        "Claim {} has code {}, expected sequence {}",
        record.claim.claim_no,
        code,
        sequence
    );
}

/// Asserts the client reference is `{name}-{number}-{YYYYMMDD}`
pub fn assert_client_reference(record: &ClaimRecord, name: &str, number: u32, day: NaiveDate) {
    let reference = record
        .claim
        .client_reference
        .as_ref()
        .unwrap_or_else(|| panic!("Claim {} has no client reference", record.claim.claim_no));
    assert_eq!(
        (reference.name(), reference.number(), reference.date()),
        (name, number, day),
        "Claim {} has reference {}",
        record.claim.claim_no,
        reference
    );
}

/// Asserts the derived settlement status
pub fn assert_settlement(record: &ClaimRecord, expected: Option<SettlementStatus>) {
    assert_eq!(
        record.claim.settlement_status, expected,
        "Claim {} settlement: paid {} of {:?}",
        record.claim.claim_no,
        record.claim.total_amount_paid(),
        record.claim.claimed_amount
    );
}

/// Asserts created, skipped and failed counts of an import
pub fn assert_import_counts(report: &ImportReport, created: usize, skipped: usize, errors: usize) {
    assert_eq!(
        (report.created_count(), report.skipped_count(), report.error_count()),
        (created, skipped, errors),
        "Import counts (created, skipped, errors) differ; errors: {:?}",
        report.errors
    );
}
