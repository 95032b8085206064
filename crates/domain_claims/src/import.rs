//! Bulk import row parsing
//!
//! A sheet is a header row followed by data rows with fixed positional
//! columns:
//!
//! | # | column | # | column |
//! |---|--------|---|--------|
//! | 0 | claim number | 8 | paid by intermediary |
//! | 1 | brand | 9 | paid by carrier |
//! | 2 | claimant | 10 | paid by insurer |
//! | 3 | intent flag | 11 | branch |
//! | 4 | intent date | 12 | savings |
//! | 5 | formal flag | 13 | settlement |
//! | 6 | formal date | 14 | exposure |
//! | 7 | value | 15 | status |
//!
//! Date and amount cells holding `-` count as empty, and dates also read
//! as `MM/DD/YY`, the way exported sheets write them. Export adds columns
//! the import layout lacks, so an export is a report, not an import
//! template.
//!
//! Parsing is pure. The service decides duplicates and persists.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::money::{ensure_storable, parse_amount_text, to_cents};
use core_kernel::temporal::parse_date;
use core_kernel::ClientId;

use crate::claim::{Branch, Claim, ClaimStatus, SettlementStatus};
use crate::validation::{BRAND_MAX_LEN, CLAIM_NO_MAX_LEN, NAME_MAX_LEN};

/// One cell as read from a spreadsheet or CSV file
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl SheetCell {
    /// Blank text counts as empty
    pub fn is_empty(&self) -> bool {
        match self {
            SheetCell::Empty => true,
            SheetCell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text rendering, `None` when empty
    ///
    /// Whole numbers render without a fractional part so a numeric claim
    /// number `1001` reads back as `"1001"`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SheetCell::Empty => None,
            SheetCell::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            SheetCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            SheetCell::Number(n) => Some(n.to_string()),
            SheetCell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            SheetCell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for SheetCell {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            SheetCell::Empty
        } else {
            SheetCell::Text(value.to_string())
        }
    }
}

/// Column positions
pub mod columns {
    pub const CLAIM_NO: usize = 0;
    pub const BRAND: usize = 1;
    pub const CLAIMANT: usize = 2;
    pub const INTENT_FLAG: usize = 3;
    pub const INTENT_DATE: usize = 4;
    pub const FORMAL_FLAG: usize = 5;
    pub const FORMAL_DATE: usize = 6;
    pub const VALUE: usize = 7;
    pub const PAID_INTERMEDIARY: usize = 8;
    pub const PAID_CARRIER: usize = 9;
    pub const PAID_INSURER: usize = 10;
    pub const BRANCH: usize = 11;
    pub const SAVINGS: usize = 12;
    pub const SETTLEMENT: usize = 13;
    pub const EXPOSURE: usize = 14;
    pub const STATUS: usize = 15;
}

/// Why a data row could not be turned into a claim
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("Missing claim number")]
    MissingClaimNo,

    #[error("Missing claimant name")]
    MissingClaimant,

    #[error("Invalid date '{value}' in column {column}")]
    InvalidDate { column: usize, value: String },

    #[error("Invalid amount '{value}' in column {column}")]
    InvalidAmount { column: usize, value: String },

    #[error("Amount {value} in column {column} is outside 0 to 9999999999.99")]
    AmountOutOfRange { column: usize, value: String },

    #[error("Value in column {column} exceeds {max} characters")]
    TooLong { column: usize, max: usize },
}

/// A parsed data row
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub claim_no: String,
    pub brand: Option<String>,
    pub claimant: String,
    pub intent_to_claim: bool,
    pub intent_date: Option<NaiveDate>,
    pub formal_claim_received: bool,
    pub formal_claim_date: Option<NaiveDate>,
    pub claimed_amount: Option<Decimal>,
    pub paid_by_intermediary: Option<Decimal>,
    pub paid_by_carrier: Option<Decimal>,
    pub paid_by_insurer: Option<Decimal>,
    pub branch: Option<Branch>,
    pub total_savings: Option<Decimal>,
    pub settlement_status: Option<SettlementStatus>,
    pub financial_exposure: Option<Decimal>,
    pub status: ClaimStatus,
}

impl ImportRow {
    /// Unsaved claim for `client`
    pub fn into_claim(self, client_id: ClientId, now: DateTime<Utc>) -> Claim {
        let mut claim = Claim::new(self.claim_no, client_id, now);
        claim.brand = self.brand;
        claim.claimant = Some(self.claimant);
        claim.intent_to_claim = Some(self.intent_to_claim);
        claim.intent_date = self.intent_date;
        claim.formal_claim_received = Some(self.formal_claim_received);
        claim.formal_claim_date = self.formal_claim_date;
        claim.claimed_amount = self.claimed_amount;
        claim.paid_by_intermediary = self.paid_by_intermediary;
        claim.paid_by_carrier = self.paid_by_carrier;
        claim.paid_by_insurer = self.paid_by_insurer;
        claim.branch = self.branch;
        claim.total_savings = self.total_savings;
        claim.settlement_status = self.settlement_status;
        claim.financial_exposure = self.financial_exposure;
        claim.status = self.status;
        claim
    }
}

static EMPTY: SheetCell = SheetCell::Empty;

fn cell(cells: &[SheetCell], index: usize) -> &SheetCell {
    cells.get(index).unwrap_or(&EMPTY)
}

/// True when every cell is empty
pub fn is_blank_row(cells: &[SheetCell]) -> bool {
    cells.iter().all(SheetCell::is_empty)
}

/// Claim number of a row, if any
pub fn claim_number(cells: &[SheetCell]) -> Option<String> {
    cell(cells, columns::CLAIM_NO).as_text()
}

/// `YES/Y/TRUE/1` and `true` count as yes, anything else as no
pub fn parse_flag(value: &SheetCell) -> bool {
    match value {
        SheetCell::Bool(b) => *b,
        SheetCell::Number(n) => *n == 1.0,
        SheetCell::Text(text) => matches!(
            text.trim().to_uppercase().as_str(),
            "YES" | "Y" | "TRUE" | "1"
        ),
        _ => false,
    }
}

fn is_dash(value: &SheetCell) -> bool {
    matches!(value, SheetCell::Text(text) if text.trim() == "-")
}

/// Native dates or `YYYY-MM-DD` / `DD/MM/YYYY` / `MM/DD/YY` text
pub fn parse_date_cell(value: &SheetCell, column: usize) -> Result<Option<NaiveDate>, RowError> {
    if is_dash(value) {
        return Ok(None);
    }
    match value {
        SheetCell::Date(date) => Ok(Some(*date)),
        other => match other.as_text() {
            None => Ok(None),
            Some(text) => {
                let two_digit_year = text.split('/').nth(2).is_some_and(|year| year.len() == 2);
                let parsed = if two_digit_year {
                    NaiveDate::parse_from_str(&text, "%m/%d/%y").ok()
                } else {
                    parse_date(&text).ok()
                };
                parsed
                    .map(Some)
                    .ok_or(RowError::InvalidDate { column, value: text })
            }
        },
    }
}

/// Numbers, or text stripped to digits and `.`
///
/// Negative values and values past the column range are row errors.
pub fn parse_amount_cell(value: &SheetCell, column: usize) -> Result<Option<Decimal>, RowError> {
    if is_dash(value) {
        return Ok(None);
    }
    let invalid = |value: String| RowError::InvalidAmount { column, value };
    let amount = match value {
        SheetCell::Empty => None,
        SheetCell::Number(n) => Some(
            Decimal::from_f64(*n)
                .map(to_cents)
                .ok_or_else(|| invalid(n.to_string()))?,
        ),
        SheetCell::Text(text) => parse_amount_text(text).map_err(|_| invalid(text.clone()))?,
        SheetCell::Bool(b) => return Err(invalid(b.to_string())),
        SheetCell::Date(d) => return Err(invalid(d.to_string())),
    };
    amount
        .map(|a| {
            ensure_storable(a).map_err(|_| RowError::AmountOutOfRange {
                column,
                value: a.to_string(),
            })
        })
        .transpose()
}

fn bounded_text(cells: &[SheetCell], column: usize, max: usize) -> Result<Option<String>, RowError> {
    match cell(cells, column).as_text() {
        Some(text) if text.chars().count() > max => Err(RowError::TooLong { column, max }),
        other => Ok(other),
    }
}

/// Settlement synonyms; unknown values give `None`
pub fn parse_settlement(value: &SheetCell) -> Option<SettlementStatus> {
    if let SheetCell::Bool(b) = value {
        return Some(if *b {
            SettlementStatus::Settled
        } else {
            SettlementStatus::NotSettled
        });
    }
    let text = value.as_text()?.to_uppercase();
    match text.as_str() {
        "SETTLED" | "YES" | "Y" | "TRUE" | "1" => Some(SettlementStatus::Settled),
        "NOT SETTLED" | "NOT_SETTLED" | "NO" | "N" | "FALSE" | "0" => {
            Some(SettlementStatus::NotSettled)
        }
        "PARTIAL" | "PARTIALLY SETTLED" | "PARTIAL_SETTLED" => Some(SettlementStatus::Partial),
        _ => None,
    }
}

/// Parses a data row
pub fn parse_row(cells: &[SheetCell]) -> Result<ImportRow, RowError> {
    let claim_no = bounded_text(cells, columns::CLAIM_NO, CLAIM_NO_MAX_LEN)?
        .ok_or(RowError::MissingClaimNo)?;
    let claimant = bounded_text(cells, columns::CLAIMANT, NAME_MAX_LEN)?
        .ok_or(RowError::MissingClaimant)?;

    Ok(ImportRow {
        claim_no,
        brand: bounded_text(cells, columns::BRAND, BRAND_MAX_LEN)?,
        claimant,
        intent_to_claim: parse_flag(cell(cells, columns::INTENT_FLAG)),
        intent_date: parse_date_cell(cell(cells, columns::INTENT_DATE), columns::INTENT_DATE)?,
        formal_claim_received: parse_flag(cell(cells, columns::FORMAL_FLAG)),
        formal_claim_date: parse_date_cell(cell(cells, columns::FORMAL_DATE), columns::FORMAL_DATE)?,
        claimed_amount: parse_amount_cell(cell(cells, columns::VALUE), columns::VALUE)?,
        paid_by_intermediary: parse_amount_cell(
            cell(cells, columns::PAID_INTERMEDIARY),
            columns::PAID_INTERMEDIARY,
        )?,
        paid_by_carrier: parse_amount_cell(cell(cells, columns::PAID_CARRIER), columns::PAID_CARRIER)?,
        paid_by_insurer: parse_amount_cell(cell(cells, columns::PAID_INSURER), columns::PAID_INSURER)?,
        branch: cell(cells, columns::BRANCH)
            .as_text()
            .and_then(|code| Branch::parse(&code)),
        total_savings: parse_amount_cell(cell(cells, columns::SAVINGS), columns::SAVINGS)?,
        settlement_status: parse_settlement(cell(cells, columns::SETTLEMENT)),
        financial_exposure: parse_amount_cell(cell(cells, columns::EXPOSURE), columns::EXPOSURE)?,
        status: cell(cells, columns::STATUS)
            .as_text()
            .and_then(|s| ClaimStatus::parse(&s))
            .unwrap_or_default(),
    })
}

/// A duplicate row left untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Sheet row number, header being row 1
    pub row: usize,
    pub claim_no: String,
}

/// A row that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRow {
    /// Sheet row number, header being row 1
    pub row: usize,
    pub claim_no: Option<String>,
    pub message: String,
}

/// Outcome of one import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Claim numbers created, in sheet order
    pub created: Vec<String>,
    pub skipped: Vec<SkippedRow>,
    pub errors: Vec<FailedRow>,
}

impl ImportReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// True when the sheet held no data rows
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.skipped.is_empty() && self.errors.is_empty()
    }
}
