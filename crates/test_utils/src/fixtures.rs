//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for clients, claims and upload rows. Dates and
//! instants are fixed so generated references stay predictable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{ClaimCode, ClientCode, ClientReference, FixedClock};
use domain_claims::{Branch, Claim, ClaimForm, ClaimRecord, Client, SheetCell};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard business day (June 1, 2025)
    pub fn business_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    /// The day after [`Self::business_day`]
    pub fn next_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    /// Noon UTC on the business day
    pub fn business_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    /// Clock pinned to the business day
    pub fn clock() -> FixedClock {
        FixedClock::on(Self::business_day())
    }
}

/// Fixture for client data
pub struct ClientFixtures;

impl ClientFixtures {
    /// `Acme Corp (CL00001)`
    pub fn acme() -> Client {
        Client::new(ClientCode::first(), "Acme Corp", TemporalFixtures::business_noon())
    }

    /// `Beta LLC (CL00002)`
    pub fn beta() -> Client {
        Client::new(
            ClientCode::from_sequence(2).unwrap(),
            "Beta LLC",
            TemporalFixtures::business_noon(),
        )
    }
}

/// Fixture for claim data
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Minimal valid form: claim number, client, branch and intent date
    pub fn minimal_form(claim_no: &str, client: &str) -> ClaimForm {
        ClaimForm {
            claim_no: claim_no.to_string(),
            client_name: client.to_string(),
            branch: Some(Branch::Atl.code().to_string()),
            intent_date: Some(TemporalFixtures::business_day()),
            ..Default::default()
        }
    }

    /// A fully paid claim: $1,000 claimed, all of it paid by the carrier
    pub fn settled_form(claim_no: &str, client: &str) -> ClaimForm {
        ClaimForm {
            claimed_amount: Some(dec!(1000.00)),
            paid_by_carrier: Some(dec!(1000.00)),
            ..Self::minimal_form(claim_no, client)
        }
    }

    /// A stored Acme claim carrying its generated identifiers
    pub fn acme_record(claim_no: &str) -> ClaimRecord {
        let client = ClientFixtures::acme();
        let mut claim = Claim::new(claim_no, client.id, TemporalFixtures::business_noon());
        claim.branch = Some(Branch::Atl);
        claim.intent_date = Some(TemporalFixtures::business_day());
        claim.claim_id = Some(ClaimCode::first());
        claim.client_reference = Some(ClientReference::new(
            "AcmeCorp",
            1,
            TemporalFixtures::business_day(),
        ));
        ClaimRecord { claim, client }
    }
}

/// Fixture for spreadsheet upload rows
pub struct UploadFixtures;

impl UploadFixtures {
    /// Header row in upload column order
    pub fn header() -> Vec<&'static str> {
        vec![
            "Shipment No",
            "Brand",
            "Claimant",
            "Intent",
            "Intent Date",
            "Formal",
            "Formal Date",
            "Value",
            "ISCM Paid",
            "Carrier Paid",
            "Insurance",
            "Branch",
            "Savings",
            "Settlement",
            "Exposure",
            "Status",
        ]
    }

    /// One data row as read from a workbook
    pub fn row(claim_no: &str, claimant: &str) -> Vec<SheetCell> {
        vec![
            SheetCell::from(claim_no),
            SheetCell::from("Nike"),
            SheetCell::from(claimant),
            SheetCell::from("Yes"),
            SheetCell::Date(TemporalFixtures::business_day()),
            SheetCell::from("No"),
            SheetCell::Empty,
            SheetCell::Number(1000.0),
            SheetCell::Number(0.0),
            SheetCell::Number(250.0),
            SheetCell::Empty,
            SheetCell::from("ATL"),
            SheetCell::Empty,
            SheetCell::Empty,
            SheetCell::Empty,
            SheetCell::from("OPEN"),
        ]
    }

    /// Rows rendered as CSV text, header first
    pub fn csv(rows: &[(&str, &str)]) -> String {
        let mut text = Self::header().join(",");
        text.push('\n');
        for (claim_no, claimant) in rows {
            text.push_str(&format!(
                "{},Nike,{},Yes,2025-06-01,No,,1000,0,250,,ATL,,,,OPEN\n",
                claim_no, claimant
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acme_record_identifiers() {
        let record = ClaimFixtures::acme_record("S100");
        assert_eq!(record.claim.client_id, record.client.id);
        assert_eq!(record.claim.claim_id.unwrap().to_string(), "CLM000001");
        assert_eq!(
            record.claim.client_reference.unwrap().to_string(),
            "AcmeCorp-1-20250601"
        );
    }

    #[test]
    fn test_upload_row_matches_header() {
        assert_eq!(UploadFixtures::row("S1", "Acme").len(), UploadFixtures::header().len());
        let csv = UploadFixtures::csv(&[("S1", "Acme"), ("S2", "Beta")]);
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().skip(1).all(|line| line.split(',').count() == 16));
    }
}
