//! Claim and client validation rules
//!
//! # Claim form
//! - `claim_no` is required and must start with the configured prefix
//! - `client_name`, `branch` and `intent_date` are required
//! - `branch` and `status`, when given, must be known codes
//! - monetary amounts must lie in `0..=MAX_AMOUNT`
//! - text fields fit their columns
//!
//! Uniqueness of `claim_no` needs the store and is checked by the service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::money::{ensure_storable, MoneyError};

use crate::claim::{Branch, ClaimForm, ClaimStatus};
use crate::client::normalize_client_name;
use crate::error::ClaimError;

/// A message attached to one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the input is valid
    pub is_valid: bool,
    /// Field-level errors
    pub errors: Vec<FieldError>,
    /// Non-fatal issues
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Converts into `Err(ClaimError::Validation)` when invalid
    pub fn into_result(self) -> Result<(), ClaimError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ClaimError::Validation(self.errors))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Configurable form rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRules {
    /// Required leading text of a submitted claim number
    pub claim_no_prefix: String,
}

impl Default for ClaimRules {
    fn default() -> Self {
        Self {
            claim_no_prefix: "S".to_string(),
        }
    }
}

const REQUIRED: &str = "This field is required.";

/// Longest accepted claim number
pub const CLAIM_NO_MAX_LEN: usize = 100;
/// Longest accepted client or claimant name
pub const NAME_MAX_LEN: usize = 200;
/// Longest accepted brand
pub const BRAND_MAX_LEN: usize = 100;

/// Message for text over `max` characters, `None` when it fits
pub fn length_error(value: &str, max: usize) -> Option<String> {
    let len = value.trim().chars().count();
    (len > max).then(|| {
        format!(
            "Ensure this value has at most {} characters (it has {}).",
            max, len
        )
    })
}

/// Message for an amount outside the storable range
pub fn amount_error(amount: Decimal) -> Option<String> {
    match ensure_storable(amount) {
        Ok(_) => None,
        Err(MoneyError::TooLarge(_)) => {
            Some("Ensure this value is less than or equal to 9999999999.99.".to_string())
        }
        Err(_) => Some("Ensure this value is greater than or equal to 0.".to_string()),
    }
}

/// Validator for submitted claims and clients
pub struct ClaimValidator;

impl ClaimValidator {
    /// Validates a claim form
    pub fn validate_form(form: &ClaimForm, rules: &ClaimRules) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let claim_no = form.claim_no.trim();
        if claim_no.is_empty() {
            result.add_error("claim_no", REQUIRED);
        } else if !claim_no.starts_with(&rules.claim_no_prefix) {
            result.add_error(
                "claim_no",
                format!("Claim number must start with '{}'.", rules.claim_no_prefix),
            );
        } else if let Some(message) = length_error(claim_no, CLAIM_NO_MAX_LEN) {
            result.add_error("claim_no", message);
        }

        result.merge(Self::validate_client_name(&form.client_name));

        match form.branch.as_deref().map(str::trim) {
            None | Some("") => result.add_error("branch", REQUIRED),
            Some(code) if Branch::parse(code).is_none() => {
                result.add_error("branch", format!("Select a valid choice. {} is not one of the available choices.", code))
            }
            Some(_) => {}
        }

        let texts = [
            ("brand", form.brand.as_deref(), BRAND_MAX_LEN),
            ("claimant", form.claimant.as_deref(), NAME_MAX_LEN),
        ];
        for (field, value, max) in texts {
            if let Some(message) = value.and_then(|v| length_error(v, max)) {
                result.add_error(field, message);
            }
        }

        if form.intent_date.is_none() {
            result.add_error("intent_date", REQUIRED);
        }

        if let Some(status) = form.status.as_deref() {
            if ClaimStatus::parse(status).is_none() {
                result.add_error("status", format!("Unknown status '{}'.", status));
            }
        }

        let amounts = [
            ("claimed_amount", form.claimed_amount),
            ("paid_by_carrier", form.paid_by_carrier),
            ("paid_by_intermediary", form.paid_by_intermediary),
            ("paid_by_insurer", form.paid_by_insurer),
            ("total_savings", form.total_savings),
            ("financial_exposure", form.financial_exposure),
        ];
        for (field, amount) in amounts {
            if let Some(message) = amount.and_then(amount_error) {
                result.add_error(field, message);
            }
        }

        if let (Some(intent), Some(formal)) = (form.intent_date, form.formal_claim_date) {
            if formal < intent {
                result.add_warning("Formal claim date is before the intent date");
            }
        }

        result
    }

    /// Validates a client name
    pub fn validate_client_name(name: &str) -> ValidationResult {
        let mut result = ValidationResult::ok();
        match normalize_client_name(name) {
            None => result.add_error("client_name", "Client name is required."),
            Some(normalized) => {
                if let Some(message) = length_error(&normalized, NAME_MAX_LEN) {
                    result.add_error("client_name", message);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn valid_form() -> ClaimForm {
        ClaimForm {
            claim_no: "S1001".to_string(),
            client_name: "Acme Corp".to_string(),
            branch: Some("ATL".to_string()),
            intent_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_form() {
        let result = ClaimValidator::validate_form(&valid_form(), &ClaimRules::default());
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_prefix_is_enforced() {
        let form = ClaimForm {
            claim_no: "X1001".to_string(),
            ..valid_form()
        };
        let result = ClaimValidator::validate_form(&form, &ClaimRules::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "claim_no");
    }

    #[test]
    fn test_negative_amount() {
        let form = ClaimForm {
            paid_by_carrier: Some(dec!(-1)),
            ..valid_form()
        };
        let result = ClaimValidator::validate_form(&form, &ClaimRules::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "paid_by_carrier");
    }

    #[test]
    fn test_amount_above_column_range() {
        let form = ClaimForm {
            claimed_amount: Some(Decimal::MAX),
            paid_by_insurer: Some(dec!(9999999999.99)),
            ..valid_form()
        };
        let result = ClaimValidator::validate_form(&form, &ClaimRules::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "claimed_amount");
        assert!(result.errors[0].message.contains("less than or equal"));
    }

    #[test]
    fn test_overlong_text_fields() {
        let form = ClaimForm {
            claim_no: format!("S{}", "1".repeat(CLAIM_NO_MAX_LEN)),
            client_name: "A".repeat(NAME_MAX_LEN + 1),
            brand: Some("B".repeat(BRAND_MAX_LEN)),
            ..valid_form()
        };
        let result = ClaimValidator::validate_form(&form, &ClaimRules::default());
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["claim_no", "client_name"]);
    }
}
