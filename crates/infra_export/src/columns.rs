//! Export column set
//!
//! Every format renders the same nineteen columns from the same strings, so
//! a CSV and a workbook of one list read identically.

use chrono::{DateTime, Utc};

use core_kernel::money::format_whole_dollars;
use core_kernel::temporal::short_or_dash;
use domain_claims::ClaimRecord;

pub const HEADERS: [&str; 19] = [
    "Shipment No",
    "Brand",
    "Claimant",
    "Claim ID",
    "Client Name",
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
    "Closed",
];

pub const SHIPMENT_NO: usize = 0;
pub const BRAND: usize = 1;
pub const CLAIMANT: usize = 2;
pub const CLIENT_NAME: usize = 4;

const MISSING: &str = "-";

fn text_or_dash(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

fn yes_no(flag: Option<bool>) -> String {
    if flag.unwrap_or(false) { "Yes" } else { "No" }.to_string()
}

/// Renders one claim as display strings, in [`HEADERS`] order
pub fn render_row(record: &ClaimRecord) -> Vec<String> {
    let claim = &record.claim;
    vec![
        claim.claim_no.clone(),
        text_or_dash(claim.brand.as_deref()),
        text_or_dash(claim.claimant.as_deref()),
        claim
            .claim_id
            .map(|code| code.to_string())
            .unwrap_or_else(|| MISSING.to_string()),
        text_or_dash(Some(&record.client.name)),
        yes_no(claim.intent_to_claim),
        short_or_dash(claim.intent_date),
        yes_no(claim.formal_claim_received),
        short_or_dash(claim.formal_claim_date),
        format_whole_dollars(claim.claimed_amount),
        format_whole_dollars(claim.paid_by_intermediary),
        format_whole_dollars(claim.paid_by_carrier),
        format_whole_dollars(claim.paid_by_insurer),
        claim
            .branch
            .map(|b| b.code().to_string())
            .unwrap_or_else(|| MISSING.to_string()),
        format_whole_dollars(claim.total_savings),
        claim
            .settlement_status
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| MISSING.to_string()),
        format_whole_dollars(claim.financial_exposure),
        claim.status.label().to_string(),
        short_or_dash(claim.closed_date),
    ]
}

/// `claims_{client|all_clients}_{YYYYMMDD_HHMMSS}`
///
/// Spaces and slashes in the client name become underscores.
pub fn export_file_stem(client_name: Option<&str>, now: DateTime<Utc>) -> String {
    let segment = client_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.replace([' ', '/', '\\'], "_"))
        .unwrap_or_else(|| "all_clients".to_string());
    format!("claims_{}_{}", segment, timestamp(now))
}

/// `YYYYMMDD_HHMMSS`
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use core_kernel::{ClaimCode, ClientCode};
    use domain_claims::{Branch, Claim, Client, SettlementStatus};
    use rust_decimal_macros::dec;

    fn record() -> ClaimRecord {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let client = Client::new(ClientCode::first(), "Acme Corp", now);
        let mut claim = Claim::new("S1001", client.id, now);
        claim.claim_id = Some(ClaimCode::first());
        claim.intent_to_claim = Some(true);
        claim.intent_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        claim.claimed_amount = Some(dec!(1234.56));
        claim.paid_by_carrier = Some(dec!(1000));
        claim.branch = Some(Branch::Atl);
        claim.settlement_status = Some(SettlementStatus::Partial);
        ClaimRecord { claim, client }
    }

    #[test]
    fn test_row_matches_headers() {
        let row = render_row(&record());
        assert_eq!(row.len(), HEADERS.len());
        assert_eq!(row[SHIPMENT_NO], "S1001");
        assert_eq!(row[BRAND], "-");
        assert_eq!(row[3], "CLM000001");
        assert_eq!(row[CLIENT_NAME], "Acme Corp");
        assert_eq!(row[5], "Yes");
        assert_eq!(row[6], "06/01/25");
        assert_eq!(row[7], "No");
        assert_eq!(row[8], "-");
        assert_eq!(row[9], "$1,235");
        assert_eq!(row[10], "$0");
        assert_eq!(row[11], "$1,000");
        assert_eq!(row[13], "ATL");
        assert_eq!(row[15], "Partially Settled");
        assert_eq!(row[17], "Open");
    }

    #[test]
    fn test_file_stem() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 14, 5, 9).unwrap();
        assert_eq!(export_file_stem(None, now), "claims_all_clients_20250601_140509");
        assert_eq!(
            export_file_stem(Some("Acme Corp/East"), now),
            "claims_Acme_Corp_East_20250601_140509"
        );
    }
}
