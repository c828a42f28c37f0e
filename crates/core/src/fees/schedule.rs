//! Fee schedule types and balance arithmetic.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scolara_shared::types::{Cents, FeeScheduleId};

/// One payable line of a fee schedule: either the principal fee itself or
/// one of its installments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeLine {
    /// Unique identifier of the line.
    pub id: FeeScheduleId,
    /// Amount owed on this line, in minor currency units.
    pub amount_cents: Cents,
    /// Payment sequence within the principal; `Some` only for installments.
    pub installment_order: Option<i32>,
    /// Optional due date, used for status derivation.
    pub due_date: Option<NaiveDate>,
}

/// Settlement status of a fee line, derived on read.
///
/// Never persisted: status is a pure function of the payment ledger, so a
/// stored column could only ever drift from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeStatus {
    /// Fully settled.
    Paid,
    /// Some payment recorded, balance outstanding.
    PartiallyPaid,
    /// Nothing paid and not yet due.
    Pending,
    /// Nothing paid and past the due date.
    Overdue,
}

impl FeeStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Pending => "PENDING",
            Self::Overdue => "OVERDUE",
        }
    }
}

/// Derives the settlement status of a fee line.
///
/// PAID if `sum_paid >= amount_cents`; else PARTIALLY_PAID if anything was
/// paid; else OVERDUE if the due date has passed; else PENDING. Exactly one
/// status applies for any input.
#[must_use]
pub fn derive_status(
    amount_cents: Cents,
    sum_paid: Cents,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> FeeStatus {
    if sum_paid >= amount_cents {
        FeeStatus::Paid
    } else if sum_paid > 0 {
        FeeStatus::PartiallyPaid
    } else if due_date.is_some_and(|due| due < today) {
        FeeStatus::Overdue
    } else {
        FeeStatus::Pending
    }
}

/// A consistent snapshot of a principal fee, its installments, and the sums
/// already paid per line by one student.
///
/// The persistence layer builds this from reads taken inside a single
/// serializable transaction; the view itself never touches the store.
#[derive(Debug, Clone)]
pub struct LedgerView {
    principal: FeeLine,
    installments: Vec<FeeLine>,
    paid: HashMap<FeeScheduleId, Cents>,
}

impl LedgerView {
    /// Builds a ledger view. Installments are kept sorted by
    /// `installment_order` ascending regardless of input order.
    #[must_use]
    pub fn new(
        principal: FeeLine,
        mut installments: Vec<FeeLine>,
        paid: HashMap<FeeScheduleId, Cents>,
    ) -> Self {
        installments.sort_by_key(|line| line.installment_order);
        Self {
            principal,
            installments,
            paid,
        }
    }

    /// The principal fee line.
    #[must_use]
    pub const fn principal(&self) -> &FeeLine {
        &self.principal
    }

    /// The installment lines, ordered ascending.
    #[must_use]
    pub fn installments(&self) -> &[FeeLine] {
        &self.installments
    }

    /// Sum of prior payments recorded against a line.
    #[must_use]
    pub fn sum_paid(&self, line_id: FeeScheduleId) -> Cents {
        self.paid.get(&line_id).copied().unwrap_or(0)
    }

    /// Looks up a line (principal or installment) by id.
    #[must_use]
    pub fn line(&self, line_id: FeeScheduleId) -> Option<&FeeLine> {
        if self.principal.id == line_id {
            return Some(&self.principal);
        }
        self.installments.iter().find(|line| line.id == line_id)
    }

    /// Remaining balance on a single line, floored at zero.
    #[must_use]
    pub fn line_remaining(&self, line: &FeeLine) -> Cents {
        (line.amount_cents - self.sum_paid(line.id)).max(0)
    }

    /// Remaining balance across the whole fee: the principal's amount minus
    /// everything paid against the principal and every installment.
    ///
    /// Guards against double-booking when partial payments exist on both the
    /// principal and installments simultaneously.
    #[must_use]
    pub fn global_remaining(&self) -> Cents {
        let paid_total: Cents = self.sum_paid(self.principal.id)
            + self
                .installments
                .iter()
                .map(|line| self.sum_paid(line.id))
                .sum::<Cents>();
        (self.principal.amount_cents - paid_total).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[rstest]
    #[case(10_000, 10_000, None, FeeStatus::Paid)]
    #[case(10_000, 15_000, None, FeeStatus::Paid)]
    #[case(10_000, 1, None, FeeStatus::PartiallyPaid)]
    #[case(10_000, 9_999, None, FeeStatus::PartiallyPaid)]
    #[case(10_000, 0, None, FeeStatus::Pending)]
    fn test_status_without_due_date(
        #[case] amount: i64,
        #[case] paid: i64,
        #[case] due: Option<NaiveDate>,
        #[case] expected: FeeStatus,
    ) {
        assert_eq!(
            derive_status(amount, paid, due, day("2026-03-01")),
            expected
        );
    }

    #[test]
    fn test_status_overdue_only_when_unpaid_and_past_due() {
        let today = day("2026-03-01");

        // Past due, nothing paid.
        assert_eq!(
            derive_status(10_000, 0, Some(day("2026-02-28")), today),
            FeeStatus::Overdue
        );
        // Due today is not yet overdue.
        assert_eq!(
            derive_status(10_000, 0, Some(today), today),
            FeeStatus::Pending
        );
        // Past due but partially paid stays PARTIALLY_PAID.
        assert_eq!(
            derive_status(10_000, 500, Some(day("2026-02-28")), today),
            FeeStatus::PartiallyPaid
        );
        // Past due but settled stays PAID.
        assert_eq!(
            derive_status(10_000, 10_000, Some(day("2026-02-28")), today),
            FeeStatus::Paid
        );
    }

    #[test]
    fn test_installments_sorted_on_construction() {
        let principal = FeeLine {
            id: FeeScheduleId::new(),
            amount_cents: 30_000,
            installment_order: None,
            due_date: None,
        };
        let mk = |order| FeeLine {
            id: FeeScheduleId::new(),
            amount_cents: 10_000,
            installment_order: Some(order),
            due_date: None,
        };

        let view = LedgerView::new(principal, vec![mk(3), mk(1), mk(2)], HashMap::new());
        let orders: Vec<_> = view
            .installments()
            .iter()
            .map(|line| line.installment_order)
            .collect();
        assert_eq!(orders, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_global_remaining_spans_principal_and_installments() {
        let principal_id = FeeScheduleId::new();
        let inst_id = FeeScheduleId::new();
        let principal = FeeLine {
            id: principal_id,
            amount_cents: 20_000,
            installment_order: None,
            due_date: None,
        };
        let installment = FeeLine {
            id: inst_id,
            amount_cents: 10_000,
            installment_order: Some(1),
            due_date: None,
        };

        let mut paid = HashMap::new();
        paid.insert(principal_id, 5_000);
        paid.insert(inst_id, 4_000);

        let view = LedgerView::new(principal, vec![installment], paid);
        assert_eq!(view.global_remaining(), 11_000);
        assert_eq!(view.sum_paid(inst_id), 4_000);
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        let principal_id = FeeScheduleId::new();
        let principal = FeeLine {
            id: principal_id,
            amount_cents: 1_000,
            installment_order: None,
            due_date: None,
        };
        let mut paid = HashMap::new();
        paid.insert(principal_id, 2_000);

        let view = LedgerView::new(principal, vec![], paid);
        assert_eq!(view.global_remaining(), 0);
        let line = view.line(principal_id).unwrap().clone();
        assert_eq!(view.line_remaining(&line), 0);
    }
}
