//! Unit tests for amount helpers

use core_kernel::money::{
    ensure_non_negative, format_whole_dollars, or_zero, parse_amount_text, percentage, sum,
};
use core_kernel::MoneyError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_or_zero() {
    assert_eq!(or_zero(None), Decimal::ZERO);
    assert_eq!(or_zero(Some(dec!(12.5))), dec!(12.5));
}

#[test]
fn test_sum_treats_missing_as_zero() {
    assert_eq!(sum([Some(dec!(100)), None, Some(dec!(50.25))]), dec!(150.25));
    assert_eq!(sum(Vec::<Option<Decimal>>::new()), Decimal::ZERO);
}

#[test]
fn test_ensure_non_negative() {
    assert_eq!(ensure_non_negative(dec!(0)), Ok(dec!(0)));
    assert_eq!(ensure_non_negative(dec!(-1)), Err(MoneyError::Negative(dec!(-1))));
}

#[test]
fn test_parse_amount_text_strips_symbols() {
    assert_eq!(parse_amount_text("USD 2,000").unwrap(), Some(dec!(2000)));
    assert_eq!(parse_amount_text("  ").unwrap(), None);
}

#[test]
fn test_percentage() {
    assert_eq!(percentage(dec!(1), dec!(4)), dec!(25));
    assert_eq!(percentage(dec!(1), dec!(3)), dec!(33.33));
    assert_eq!(percentage(dec!(5), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn test_format_whole_dollars_rounding_half_even() {
    assert_eq!(format_whole_dollars(Some(dec!(2.5))), "$2");
    assert_eq!(format_whole_dollars(Some(dec!(3.5))), "$4");
    assert_eq!(format_whole_dollars(Some(dec!(1000))), "$1,000");
    assert_eq!(format_whole_dollars(Some(Decimal::ZERO)), "$0");
}
