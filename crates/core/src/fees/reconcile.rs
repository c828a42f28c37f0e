//! Payment admission against a fee ledger view.
//!
//! The reconciler decides whether a requested payment is admissible under
//! the installment-ordering and balance-capping rules. It is a pure
//! function of the ledger view: rejection never mutates anything, and the
//! caller performs the single insert only after admission succeeds.

use scolara_shared::types::{Cents, FeeScheduleId};

use super::schedule::LedgerView;

/// Reasons a payment request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    /// Payment amounts must be strictly positive integers.
    #[error("payment amount must be a positive integer, got {amount_cents}")]
    NonPositiveAmount {
        /// The offending requested amount.
        amount_cents: Cents,
    },

    /// The target line is neither the principal nor one of its installments.
    #[error("fee schedule line {0} does not belong to this fee")]
    UnknownLine(FeeScheduleId),

    /// An earlier installment is not yet fully settled.
    #[error(
        "installment {unsettled_order} must be fully settled first ({outstanding_cents} outstanding)"
    )]
    SequenceViolation {
        /// Line id of the first unsettled earlier installment.
        unsettled_line: FeeScheduleId,
        /// Its payment sequence number.
        unsettled_order: i32,
        /// How much is still owed on it.
        outstanding_cents: Cents,
    },

    /// The request exceeds the remaining balance of the target line.
    #[error("amount exceeds the remaining balance of this installment ({remaining_cents} remaining)")]
    LineOverpayment {
        /// Remaining balance on the target line.
        remaining_cents: Cents,
    },

    /// The request exceeds the remaining balance of the whole fee.
    #[error("amount exceeds the remaining balance of this fee ({remaining_cents} remaining)")]
    GlobalOverpayment {
        /// Remaining balance across the principal and all installments.
        remaining_cents: Cents,
    },
}

/// Decides whether a payment of `amount_cents` against `target_id` is
/// admissible under the ledger view.
///
/// Rules:
/// - the amount must be strictly positive;
/// - an installment may only be paid once every earlier-ordered sibling is
///   fully settled, and the amount is capped by both the installment's own
///   remaining balance and the fee's global remaining balance;
/// - a lump payment on the principal skips the sequence check and is capped
///   by the global remaining balance only.
///
/// # Errors
///
/// Returns the first violated rule; checks run in the order above.
pub fn admit_payment(
    view: &LedgerView,
    target_id: FeeScheduleId,
    amount_cents: Cents,
) -> Result<(), AdmissionError> {
    if amount_cents <= 0 {
        return Err(AdmissionError::NonPositiveAmount { amount_cents });
    }

    if target_id == view.principal().id {
        return check_global_cap(view, amount_cents);
    }

    let Some(target) = view.line(target_id) else {
        return Err(AdmissionError::UnknownLine(target_id));
    };
    let target_order = target
        .installment_order
        .ok_or(AdmissionError::UnknownLine(target_id))?;

    // Sequential-order rule: every earlier installment must be settled.
    for earlier in view
        .installments()
        .iter()
        .filter(|line| line.installment_order.is_some_and(|o| o < target_order))
    {
        let outstanding = view.line_remaining(earlier);
        if outstanding > 0 {
            return Err(AdmissionError::SequenceViolation {
                unsettled_line: earlier.id,
                unsettled_order: earlier.installment_order.unwrap_or(0),
                outstanding_cents: outstanding,
            });
        }
    }

    // Per-line cap.
    let line_remaining = view.line_remaining(target);
    if amount_cents > line_remaining {
        return Err(AdmissionError::LineOverpayment {
            remaining_cents: line_remaining,
        });
    }

    check_global_cap(view, amount_cents)
}

fn check_global_cap(view: &LedgerView, amount_cents: Cents) -> Result<(), AdmissionError> {
    let remaining = view.global_remaining();
    if amount_cents > remaining {
        return Err(AdmissionError::GlobalOverpayment {
            remaining_cents: remaining,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::fees::schedule::{FeeLine, FeeStatus, derive_status};
    use chrono::NaiveDate;

    const PRINCIPAL_AMOUNT: i64 = 20_000_000;
    const INSTALLMENT_AMOUNT: i64 = 10_000_000;

    struct Fixture {
        principal: FeeScheduleId,
        installments: Vec<FeeScheduleId>,
        view: LedgerView,
    }

    /// Builds a principal of 20,000,000 cents, optionally split into equal
    /// ordered installments.
    fn fixture(installment_amounts: &[i64]) -> Fixture {
        let principal = FeeScheduleId::new();
        let installments: Vec<FeeScheduleId> = installment_amounts
            .iter()
            .map(|_| FeeScheduleId::new())
            .collect();

        let lines = installment_amounts
            .iter()
            .zip(&installments)
            .enumerate()
            .map(|(i, (&amount, &id))| FeeLine {
                id,
                amount_cents: amount,
                installment_order: Some(i32::try_from(i).unwrap() + 1),
                due_date: None,
            })
            .collect();

        let view = LedgerView::new(
            FeeLine {
                id: principal,
                amount_cents: PRINCIPAL_AMOUNT,
                installment_order: None,
                due_date: None,
            },
            lines,
            HashMap::new(),
        );

        Fixture {
            principal,
            installments,
            view,
        }
    }

    /// Applies an admitted payment to the fixture's paid sums.
    fn record(fx: &mut Fixture, target: FeeScheduleId, amount: i64) {
        admit_payment(&fx.view, target, amount).expect("payment should be admitted");
        let mut paid: HashMap<FeeScheduleId, i64> = HashMap::new();
        for line in std::iter::once(fx.view.principal().clone())
            .chain(fx.view.installments().iter().cloned())
        {
            let sum = fx.view.sum_paid(line.id);
            if sum > 0 {
                paid.insert(line.id, sum);
            }
        }
        *paid.entry(target).or_insert(0) += amount;
        fx.view = LedgerView::new(
            fx.view.principal().clone(),
            fx.view.installments().to_vec(),
            paid,
        );
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let fx = fixture(&[]);
        assert_eq!(
            admit_payment(&fx.view, fx.principal, 0),
            Err(AdmissionError::NonPositiveAmount { amount_cents: 0 })
        );
        assert_eq!(
            admit_payment(&fx.view, fx.principal, -5),
            Err(AdmissionError::NonPositiveAmount { amount_cents: -5 })
        );
    }

    #[test]
    fn test_rejects_unknown_line() {
        let fx = fixture(&[INSTALLMENT_AMOUNT, INSTALLMENT_AMOUNT]);
        let stranger = FeeScheduleId::new();
        assert_eq!(
            admit_payment(&fx.view, stranger, 1),
            Err(AdmissionError::UnknownLine(stranger))
        );
    }

    // Scenario A: principal with no installments, paid in two halves.
    #[test]
    fn test_lump_payments_until_exhausted() {
        let mut fx = fixture(&[]);
        let principal = fx.principal;
        record(&mut fx, principal, 10_000_000);
        record(&mut fx, principal, 10_000_000);

        assert_eq!(
            admit_payment(&fx.view, fx.principal, 1),
            Err(AdmissionError::GlobalOverpayment { remaining_cents: 0 })
        );
    }

    // Scenario B: two installments, second one first is out of order; in
    // order works; then the whole fee is exhausted.
    #[test]
    fn test_installments_enforce_sequence_then_exhaust() {
        let mut fx = fixture(&[INSTALLMENT_AMOUNT, INSTALLMENT_AMOUNT]);
        let first = fx.installments[0];
        let second = fx.installments[1];

        assert_eq!(
            admit_payment(&fx.view, second, INSTALLMENT_AMOUNT),
            Err(AdmissionError::SequenceViolation {
                unsettled_line: first,
                unsettled_order: 1,
                outstanding_cents: INSTALLMENT_AMOUNT,
            })
        );

        record(&mut fx, first, INSTALLMENT_AMOUNT);
        record(&mut fx, second, INSTALLMENT_AMOUNT);

        assert_eq!(
            admit_payment(&fx.view, fx.principal, 1),
            Err(AdmissionError::GlobalOverpayment { remaining_cents: 0 })
        );
    }

    // Scenario C: partial first installment blocks the second until settled.
    #[test]
    fn test_partial_first_installment_blocks_second() {
        let mut fx = fixture(&[INSTALLMENT_AMOUNT, INSTALLMENT_AMOUNT]);
        let first = fx.installments[0];
        let second = fx.installments[1];
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        record(&mut fx, first, 4_000_000);

        assert_eq!(
            derive_status(INSTALLMENT_AMOUNT, fx.view.sum_paid(first), None, today),
            FeeStatus::PartiallyPaid
        );
        assert_eq!(
            derive_status(INSTALLMENT_AMOUNT, fx.view.sum_paid(second), None, today),
            FeeStatus::Pending
        );

        assert_eq!(
            admit_payment(&fx.view, second, 1),
            Err(AdmissionError::SequenceViolation {
                unsettled_line: first,
                unsettled_order: 1,
                outstanding_cents: 6_000_000,
            })
        );

        record(&mut fx, first, 6_000_000);
        record(&mut fx, second, INSTALLMENT_AMOUNT);
    }

    // Scenario D: lump payment on the principal bypasses sequence checks.
    #[test]
    fn test_lump_payment_bypasses_sequence() {
        let mut fx = fixture(&[INSTALLMENT_AMOUNT, INSTALLMENT_AMOUNT]);
        let first = fx.installments[0];

        record(&mut fx, first, INSTALLMENT_AMOUNT);
        // Second installment untouched; a lump payment for the remainder is
        // still admitted directly on the principal.
        let principal = fx.principal;
        record(&mut fx, principal, INSTALLMENT_AMOUNT);

        assert_eq!(fx.view.global_remaining(), 0);
    }

    #[test]
    fn test_exact_remaining_is_boundary() {
        let mut fx = fixture(&[INSTALLMENT_AMOUNT, INSTALLMENT_AMOUNT]);
        let first = fx.installments[0];

        // One more than the line remaining is rejected, exact is admitted.
        assert_eq!(
            admit_payment(&fx.view, first, INSTALLMENT_AMOUNT + 1),
            Err(AdmissionError::LineOverpayment {
                remaining_cents: INSTALLMENT_AMOUNT,
            })
        );
        record(&mut fx, first, INSTALLMENT_AMOUNT);

        // Same at the global level.
        assert_eq!(
            admit_payment(&fx.view, fx.principal, INSTALLMENT_AMOUNT + 1),
            Err(AdmissionError::GlobalOverpayment {
                remaining_cents: INSTALLMENT_AMOUNT,
            })
        );
        let principal = fx.principal;
        record(&mut fx, principal, INSTALLMENT_AMOUNT);
    }

    #[test]
    fn test_global_cap_sees_payments_on_both_levels() {
        let mut fx = fixture(&[INSTALLMENT_AMOUNT, INSTALLMENT_AMOUNT]);
        let first = fx.installments[0];
        let second = fx.installments[1];

        record(&mut fx, first, INSTALLMENT_AMOUNT);
        // A lump payment eats into the remainder...
        let principal = fx.principal;
        record(&mut fx, principal, 9_000_000);

        // ...so the second installment's own remaining (10,000,000) no longer
        // fits the global remaining (1,000,000).
        assert_eq!(
            admit_payment(&fx.view, second, INSTALLMENT_AMOUNT),
            Err(AdmissionError::GlobalOverpayment {
                remaining_cents: 1_000_000,
            })
        );
        record(&mut fx, second, 1_000_000);
        assert_eq!(fx.view.global_remaining(), 0);
    }

    #[test]
    fn test_gap_tolerant_orders() {
        // Orders 2 and 5: numbering may have gaps but stays sequential.
        let principal = FeeScheduleId::new();
        let low = FeeScheduleId::new();
        let high = FeeScheduleId::new();
        let view = LedgerView::new(
            FeeLine {
                id: principal,
                amount_cents: 20_000_000,
                installment_order: None,
                due_date: None,
            },
            vec![
                FeeLine {
                    id: high,
                    amount_cents: 10_000_000,
                    installment_order: Some(5),
                    due_date: None,
                },
                FeeLine {
                    id: low,
                    amount_cents: 10_000_000,
                    installment_order: Some(2),
                    due_date: None,
                },
            ],
            HashMap::new(),
        );

        assert!(matches!(
            admit_payment(&view, high, 1),
            Err(AdmissionError::SequenceViolation {
                unsettled_order: 2,
                ..
            })
        ));
        assert!(admit_payment(&view, low, 10_000_000).is_ok());
    }
}
