//! Dashboard aggregation
//!
//! Pure computation over the full claim list, so the same numbers come out
//! of every store.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use core_kernel::money::{percentage, sum};
use core_kernel::ClientCode;

use crate::claim::ClaimRecord;

/// Bucket name for claims without a settlement status or branch
pub const UNSET: &str = "UNSET";

/// Months covered by the trend
pub const TREND_MONTHS: usize = 12;

/// Clients listed in the top-clients table
pub const TOP_CLIENTS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub total_claimed: Decimal,
    pub total_paid_intermediary: Decimal,
    pub total_paid_carrier: Decimal,
    pub total_paid_insurer: Decimal,
    pub total_paid_all: Decimal,
    pub total_savings: Decimal,
    pub total_exposure: Decimal,
    /// Paid as a percentage of claimed
    pub recovery_rate: Decimal,
    /// Savings as a percentage of claimed
    pub savings_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchShare {
    pub branch: String,
    pub count: u64,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    /// `Jan 2025`
    pub month_name: String,
    pub claims: u64,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientStat {
    pub name: String,
    pub client_id: ClientCode,
    pub claim_count: u64,
    pub total_value: Decimal,
}

/// Everything the analytics dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_claims: u64,
    pub total_clients: u64,
    pub financial: FinancialMetrics,
    pub status_counts: BTreeMap<String, u64>,
    pub settlement_counts: BTreeMap<String, u64>,
    pub branches: Vec<BranchShare>,
    pub monthly_trend: Vec<MonthlyPoint>,
    pub top_clients: Vec<ClientStat>,
    pub intent_claims: u64,
    pub formal_claims: u64,
    pub average_processing_days: Decimal,
}

/// Aggregates `records` as of `today`
pub fn compute(records: &[ClaimRecord], total_clients: u64, today: NaiveDate) -> AnalyticsReport {
    let claims = || records.iter().map(|r| &r.claim);
    let total_claims = records.len() as u64;

    let total_claimed = sum(claims().map(|c| c.claimed_amount));
    let total_paid_intermediary = sum(claims().map(|c| c.paid_by_intermediary));
    let total_paid_carrier = sum(claims().map(|c| c.paid_by_carrier));
    let total_paid_insurer = sum(claims().map(|c| c.paid_by_insurer));
    let total_paid_all = sum([
        Some(total_paid_intermediary),
        Some(total_paid_carrier),
        Some(total_paid_insurer),
    ]);
    let total_savings = sum(claims().map(|c| c.total_savings));

    let financial = FinancialMetrics {
        total_claimed,
        total_paid_intermediary,
        total_paid_carrier,
        total_paid_insurer,
        total_paid_all,
        total_savings,
        total_exposure: sum(claims().map(|c| c.financial_exposure)),
        recovery_rate: percentage(total_paid_all, total_claimed),
        savings_rate: percentage(total_savings, total_claimed),
    };

    let mut status_counts = BTreeMap::new();
    let mut settlement_counts = BTreeMap::new();
    let mut branch_counts: BTreeMap<String, u64> = BTreeMap::new();
    for claim in claims() {
        *status_counts.entry(claim.status.as_str().to_string()).or_insert(0) += 1;
        let settlement = claim.settlement_status.map_or(UNSET, |s| s.as_str());
        *settlement_counts.entry(settlement.to_string()).or_insert(0) += 1;
        let branch = claim.branch.map_or(UNSET, |b| b.code());
        *branch_counts.entry(branch.to_string()).or_insert(0) += 1;
    }

    let branches = branch_counts
        .into_iter()
        .map(|(branch, count)| BranchShare {
            branch,
            count,
            percentage: percentage(Decimal::from(count), Decimal::from(total_claims)),
        })
        .collect();

    AnalyticsReport {
        total_claims,
        total_clients,
        financial,
        status_counts,
        settlement_counts,
        branches,
        monthly_trend: monthly_trend(records, today),
        top_clients: top_clients(records),
        intent_claims: claims().filter(|c| c.intent_to_claim == Some(true)).count() as u64,
        formal_claims: claims().filter(|c| c.formal_claim_received == Some(true)).count() as u64,
        average_processing_days: average_processing_days(records),
    }
}

/// First day of the month `back` months before the month of `date`
fn month_start(date: NaiveDate, back: u32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 - back as i32;
    let (year, month0) = (index.div_euclid(12), index.rem_euclid(12) as u32);
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(date)
}

/// Claim count and claimed value per calendar month, oldest first, ending
/// with the month of `today`
pub fn monthly_trend(records: &[ClaimRecord], today: NaiveDate) -> Vec<MonthlyPoint> {
    (0..TREND_MONTHS as u32)
        .rev()
        .map(|back| {
            let start = month_start(today, back);
            let in_month: Vec<_> = records
                .iter()
                .map(|r| &r.claim)
                .filter(|c| {
                    let created = c.created_at.date_naive();
                    created.year() == start.year() && created.month() == start.month()
                })
                .collect();
            MonthlyPoint {
                month: start.format("%Y-%m").to_string(),
                month_name: start.format("%b %Y").to_string(),
                claims: in_month.len() as u64,
                value: sum(in_month.iter().map(|c| c.claimed_amount)),
            }
        })
        .collect()
}

/// Clients with the most claims, ties broken by name
pub fn top_clients(records: &[ClaimRecord]) -> Vec<ClientStat> {
    let mut by_client: HashMap<_, ClientStat> = HashMap::new();
    for record in records {
        let stat = by_client.entry(record.client.id).or_insert_with(|| ClientStat {
            name: record.client.name.clone(),
            client_id: record.client.client_id,
            claim_count: 0,
            total_value: Decimal::ZERO,
        });
        stat.claim_count += 1;
        stat.total_value = sum([Some(stat.total_value), record.claim.claimed_amount]);
    }
    let mut stats: Vec<_> = by_client.into_values().collect();
    stats.sort_by(|a, b| {
        b.claim_count
            .cmp(&a.claim_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    stats.truncate(TOP_CLIENTS);
    stats
}

/// Mean days from intent to formal claim, over claims where formal is later
pub fn average_processing_days(records: &[ClaimRecord]) -> Decimal {
    let days: Vec<i64> = records
        .iter()
        .filter_map(|r| match (r.claim.intent_date, r.claim.formal_claim_date) {
            (Some(intent), Some(formal)) if formal > intent => Some((formal - intent).num_days()),
            _ => None,
        })
        .collect();
    if days.is_empty() {
        return Decimal::ZERO;
    }
    (Decimal::from(days.iter().sum::<i64>()) / Decimal::from(days.len() as u64)).round_dp(1)
}
