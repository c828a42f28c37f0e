//! Property-based tests for payment admission.
//!
//! These encode the ledger guarantees: no sequence of admitted payments can
//! overpay a principal, installments settle strictly in order, rejection is
//! pure, and status derivation is unambiguous.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;

use scolara_shared::types::FeeScheduleId;

use super::reconcile::{AdmissionError, admit_payment};
use super::schedule::{FeeLine, FeeStatus, LedgerView, derive_status};

/// A randomly generated fee: principal amount plus installment split.
#[derive(Debug, Clone)]
struct FeeShape {
    principal_amount: i64,
    installment_amounts: Vec<i64>,
}

fn fee_shape_strategy() -> impl Strategy<Value = FeeShape> {
    // Installments partition the principal exactly, as the data model
    // intends; up to 4 tranches of up to 5,000,000 minor units each.
    prop::collection::vec(1i64..=5_000_000, 0..=4).prop_map(|installment_amounts| {
        let split: i64 = installment_amounts.iter().sum();
        FeeShape {
            principal_amount: split.max(1),
            installment_amounts,
        }
    })
}

/// An attempted payment: which line (0 = principal, 1.. = installment) and
/// how much.
fn attempts_strategy() -> impl Strategy<Value = Vec<(usize, i64)>> {
    prop::collection::vec((0usize..=4, 1i64..=6_000_000), 1..=12)
}

fn build_view(shape: &FeeShape, paid: HashMap<FeeScheduleId, i64>) -> (LedgerView, Vec<FeeScheduleId>) {
    let principal_id = FeeScheduleId::new();
    let installment_ids: Vec<FeeScheduleId> = shape
        .installment_amounts
        .iter()
        .map(|_| FeeScheduleId::new())
        .collect();

    let installments = shape
        .installment_amounts
        .iter()
        .zip(&installment_ids)
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
            id: principal_id,
            amount_cents: shape.principal_amount,
            installment_order: None,
            due_date: None,
        },
        installments,
        paid,
    );

    let mut ids = vec![principal_id];
    ids.extend(installment_ids);
    (view, ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any sequence of admitted payments, the total recorded against a
    /// principal (directly or via its installments) never exceeds the
    /// principal's amount.
    #[test]
    fn prop_no_overpayment(
        shape in fee_shape_strategy(),
        attempts in attempts_strategy(),
    ) {
        let mut paid: HashMap<FeeScheduleId, i64> = HashMap::new();
        let (base_view, ids) = build_view(&shape, HashMap::new());

        for (line_index, amount) in attempts {
            let Some(&target) = ids.get(line_index) else { continue };
            let view = LedgerView::new(
                base_view.principal().clone(),
                base_view.installments().to_vec(),
                paid.clone(),
            );
            if admit_payment(&view, target, amount).is_ok() {
                *paid.entry(target).or_insert(0) += amount;
            }

            let total: i64 = paid.values().sum();
            prop_assert!(
                total <= shape.principal_amount,
                "total paid {total} exceeds principal {}",
                shape.principal_amount
            );
        }
    }

    /// Whenever an installment payment is admitted, every earlier-ordered
    /// installment is already fully settled.
    #[test]
    fn prop_sequential_settlement(
        shape in fee_shape_strategy(),
        attempts in attempts_strategy(),
    ) {
        let mut paid: HashMap<FeeScheduleId, i64> = HashMap::new();
        let (base_view, ids) = build_view(&shape, HashMap::new());

        for (line_index, amount) in attempts {
            let Some(&target) = ids.get(line_index) else { continue };
            let view = LedgerView::new(
                base_view.principal().clone(),
                base_view.installments().to_vec(),
                paid.clone(),
            );

            if admit_payment(&view, target, amount).is_ok() {
                if let Some(target_line) = view.line(target) {
                    if let Some(order) = target_line.installment_order {
                        for earlier in view
                            .installments()
                            .iter()
                            .filter(|l| l.installment_order.is_some_and(|o| o < order))
                        {
                            prop_assert!(
                                view.sum_paid(earlier.id) >= earlier.amount_cents,
                                "installment admitted while an earlier one was unsettled"
                            );
                        }
                    }
                }
                *paid.entry(target).or_insert(0) += amount;
            }
        }
    }

    /// Admission is a pure function of the view: a rejected request yields
    /// the identical rejection when replayed against the same view.
    #[test]
    fn prop_rejection_is_pure(
        shape in fee_shape_strategy(),
        line_index in 0usize..=4,
        amount in -1_000i64..=50_000_000,
    ) {
        let (view, ids) = build_view(&shape, HashMap::new());
        let Some(&target) = ids.get(line_index) else { return Ok(()) };

        let first = admit_payment(&view, target, amount);
        let second = admit_payment(&view, target, amount);
        prop_assert_eq!(first, second);
    }

    /// A payment of exactly the global remaining balance is admitted; one
    /// minor unit more is rejected.
    #[test]
    fn prop_exact_remaining_boundary(
        shape in fee_shape_strategy(),
    ) {
        let (view, _ids) = build_view(&shape, HashMap::new());
        let remaining = view.global_remaining();
        prop_assume!(remaining > 0);

        prop_assert!(admit_payment(&view, view.principal().id, remaining).is_ok());
        prop_assert_eq!(
            admit_payment(&view, view.principal().id, remaining + 1),
            Err(AdmissionError::GlobalOverpayment { remaining_cents: remaining })
        );
    }

    /// Exactly one status applies for any amount/paid/due combination, and
    /// it matches the stated thresholds.
    #[test]
    fn prop_status_unambiguous(
        amount in 1i64..=50_000_000,
        paid in 0i64..=60_000_000,
        due_offset in prop::option::of(-30i32..=30),
    ) {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let due = due_offset.map(|d| today + chrono::Duration::days(i64::from(d)));

        let status = derive_status(amount, paid, due, today);

        let expected = if paid >= amount {
            FeeStatus::Paid
        } else if paid > 0 {
            FeeStatus::PartiallyPaid
        } else if due.is_some_and(|d| d < today) {
            FeeStatus::Overdue
        } else {
            FeeStatus::Pending
        };
        prop_assert_eq!(status, expected);
    }
}
