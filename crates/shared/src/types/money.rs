//! Money helpers for integer minor currency units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts in the system are `i64` minor units (cents); there is no
//! decimal or fractional representation anywhere.

/// A monetary amount in minor currency units (e.g., cents).
pub type Cents = i64;

/// Formats a minor-unit amount as a major-unit decimal string, e.g.
/// `123456` -> `"1234.56"`.
///
/// Integer math only; negative amounts keep their sign on the major part.
#[must_use]
pub fn format_cents(amount: Cents) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let major = abs / 100;
    let minor = abs % 100;
    format!("{sign}{major}.{minor:02}")
}

/// Returns true if the amount is a valid payment amount (strictly positive).
#[must_use]
pub const fn is_positive_amount(amount: Cents) -> bool {
    amount > 0
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
