//! Tests for integer money helpers.

use rstest::rstest;

use super::{format_cents, is_positive_amount};

#[rstest]
#[case(0, "0.00")]
#[case(1, "0.01")]
#[case(99, "0.99")]
#[case(100, "1.00")]
#[case(123_456, "1234.56")]
#[case(20_000_000, "200000.00")]
#[case(-1, "-0.01")]
#[case(-123_456, "-1234.56")]
fn test_format_cents(#[case] amount: i64, #[case] expected: &str) {
    assert_eq!(format_cents(amount), expected);
}

#[test]
fn test_format_cents_extremes() {
    assert_eq!(format_cents(i64::MAX), "92233720368547758.07");
    assert_eq!(format_cents(i64::MIN), "-92233720368547758.08");
}

#[test]
fn test_is_positive_amount() {
    assert!(is_positive_amount(1));
    assert!(is_positive_amount(i64::MAX));
    assert!(!is_positive_amount(0));
    assert!(!is_positive_amount(-1));
}
