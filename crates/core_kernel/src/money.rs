//! Amount helpers with precise decimal arithmetic
//!
//! Claims carry optional monetary fields in a single currency. Missing
//! amounts count as zero in every sum; rendering follows the whole-dollar
//! style used in reports (`$1,234`).

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

/// Errors that can occur during amount handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must not be negative: {0}")]
    Negative(Decimal),

    #[error("Amount exceeds 9,999,999,999.99: {0}")]
    TooLarge(Decimal),
}

/// Largest amount a `NUMERIC(12, 2)` column holds
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// Treats a missing amount as zero
pub fn or_zero(amount: Option<Decimal>) -> Decimal {
    amount.unwrap_or(Decimal::ZERO)
}

/// Sums optional amounts, missing values counting as zero
///
/// Saturates at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    amounts.into_iter().map(or_zero).fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).unwrap_or(if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
    })
}

/// `max(0, whole - part)`, saturating
pub fn shortfall(whole: Decimal, part: Decimal) -> Decimal {
    whole
        .checked_sub(part)
        .unwrap_or(if part.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
        .max(Decimal::ZERO)
}

/// Rejects negative amounts
pub fn ensure_non_negative(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }
    Ok(amount)
}

/// Accepts amounts in `0..=MAX_AMOUNT`
pub fn ensure_storable(amount: Decimal) -> Result<Decimal, MoneyError> {
    let amount = ensure_non_negative(amount)?;
    if amount > MAX_AMOUNT {
        return Err(MoneyError::TooLarge(amount));
    }
    Ok(amount)
}

/// Rounds to cents
pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses free text such as `"$1,250.50"` by keeping only digits and dots
///
/// Returns `Ok(None)` when nothing numeric remains.
pub fn parse_amount_text(text: &str) -> Result<Option<Decimal>, MoneyError> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned
        .parse::<Decimal>()
        .map(|d| Some(to_cents(d)))
        .map_err(|_| MoneyError::InvalidAmount(text.to_string()))
}

/// Percentage of `part` in `whole`, zero when `whole` is not positive
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .map(|pct| pct.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

/// Renders an amount as whole dollars with thousands separators
///
/// Missing or zero amounts render as `$0`.
pub fn format_whole_dollars(amount: Option<Decimal>) -> String {
    let amount = match amount {
        Some(a) if !a.is_zero() => a,
        _ => return "$0".to_string(),
    };
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("$-{}", grouped)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_dollars() {
        assert_eq!(format_whole_dollars(Some(dec!(1234567.4))), "$1,234,567");
        assert_eq!(format_whole_dollars(Some(dec!(999))), "$999");
        assert_eq!(format_whole_dollars(None), "$0");
    }

    #[test]
    fn test_parse_amount_text() {
        assert_eq!(parse_amount_text("$1,250.50").unwrap(), Some(dec!(1250.50)));
        assert_eq!(parse_amount_text("n/a").unwrap(), None);
        assert!(parse_amount_text("1.2.3").is_err());
    }

    #[test]
    fn test_sum_saturates() {
        assert_eq!(sum([Some(Decimal::MAX), Some(Decimal::MAX), None]), Decimal::MAX);
        assert_eq!(sum([Some(dec!(1.5)), None, Some(dec!(2))]), dec!(3.5));
    }

    #[test]
    fn test_shortfall() {
        assert_eq!(shortfall(dec!(500), dec!(200)), dec!(300));
        assert_eq!(shortfall(dec!(200), dec!(500)), Decimal::ZERO);
        assert_eq!(shortfall(dec!(1), Decimal::MAX), Decimal::ZERO);
    }

    #[test]
    fn test_ensure_storable() {
        assert_eq!(ensure_storable(MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(ensure_storable(dec!(-1)), Err(MoneyError::Negative(dec!(-1))));
        assert_eq!(
            ensure_storable(dec!(10000000000)),
            Err(MoneyError::TooLarge(dec!(10000000000)))
        );
    }
}
