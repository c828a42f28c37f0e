//! Payment repository: admission-gated inserts and filtered listings.
//!
//! `record_payment` is the only way a payment row is created. All balance
//! reads happen inside one SERIALIZABLE transaction so that two concurrent
//! requests against the same principal cannot jointly over-commit the
//! remaining balance; the insert is the single side effect and nothing is
//! written on a rejection path.

use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IsolationLevel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use scolara_core::fees::{AdmissionError, FeeLine, LedgerView, admit_payment};
use scolara_shared::types::{FeeScheduleId, PageRequest};

use crate::entities::{fee_schedules, payments, sea_orm_active_enums::PaymentMethod, students};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Student does not exist in the school scope.
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    /// Fee schedule does not exist in the school scope.
    #[error("Fee schedule not found: {0}")]
    FeeScheduleNotFound(Uuid),

    /// The reconciler rejected the request; nothing was written.
    #[error(transparent)]
    Rejected(#[from] AdmissionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Tenant scope.
    pub school_id: Uuid,
    /// Paying student.
    pub student_id: Uuid,
    /// Target line: a principal fee or one of its installments.
    pub fee_schedule_id: Uuid,
    /// Requested amount in minor currency units.
    pub amount_cents: i64,
    /// How the money was received.
    pub method: PaymentMethod,
    /// When the money was received; defaults to now.
    pub paid_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    /// Optional due date carried on the payment record.
    pub due_date: Option<NaiveDate>,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// Auth principal that recorded the payment.
    pub recorded_by: Uuid,
}

/// A recorded payment with its resolved associations for display.
#[derive(Debug, Clone)]
pub struct PaymentWithContext {
    /// The inserted payment row.
    pub payment: payments::Model,
    /// The paying student.
    pub student: students::Model,
    /// The fee schedule line the payment targets.
    pub fee_schedule: fee_schedules::Model,
}

/// Filter options for listing payments.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Filter by student.
    pub student_id: Option<Uuid>,
    /// Filter by fee schedule line.
    pub fee_schedule_id: Option<Uuid>,
    /// Filter by payment method.
    pub method: Option<PaymentMethod>,
    /// Filter by the students' grade level.
    pub grade_level_id: Option<Uuid>,
    /// Filter by the students' classroom.
    pub classroom_id: Option<Uuid>,
    /// Only payments on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Only payments on or before this date.
    pub date_to: Option<NaiveDate>,
    /// Hard restriction applied on top of the filters (PARENT callers are
    /// limited to their linked children).
    pub restrict_to_students: Option<Vec<Uuid>>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment if the reconciler admits it.
    ///
    /// Resolves the student and the target line in school scope, loads the
    /// principal and its installments, then re-derives all paid sums inside
    /// a SERIALIZABLE transaction immediately before deciding. On admission
    /// exactly one payment row is inserted; on rejection nothing is.
    ///
    /// # Errors
    ///
    /// Returns `StudentNotFound` / `FeeScheduleNotFound` for unknown ids,
    /// `Rejected` when an admission rule is violated, or `Database` on
    /// store failures (including serialization conflicts, which callers
    /// may retry).
    pub async fn record_payment(
        &self,
        input: RecordPaymentInput,
    ) -> Result<PaymentWithContext, PaymentError> {
        let student = students::Entity::find_by_id(input.student_id)
            .filter(students::Column::SchoolId.eq(input.school_id))
            .one(&self.db)
            .await?
            .ok_or(PaymentError::StudentNotFound(input.student_id))?;

        let target = fee_schedules::Entity::find_by_id(input.fee_schedule_id)
            .filter(fee_schedules::Column::SchoolId.eq(input.school_id))
            .one(&self.db)
            .await?
            .ok_or(PaymentError::FeeScheduleNotFound(input.fee_schedule_id))?;

        // Resolve the principal: the target itself, or its parent when the
        // target is an installment.
        let principal = match target.parent_fee_id {
            Some(parent_id) => fee_schedules::Entity::find_by_id(parent_id)
                .filter(fee_schedules::Column::SchoolId.eq(input.school_id))
                .one(&self.db)
                .await?
                .ok_or(PaymentError::FeeScheduleNotFound(parent_id))?,
            None => target.clone(),
        };

        let installments = fee_schedules::Entity::find()
            .filter(fee_schedules::Column::SchoolId.eq(input.school_id))
            .filter(fee_schedules::Column::ParentFeeId.eq(principal.id))
            .order_by_asc(fee_schedules::Column::InstallmentOrder)
            .all(&self.db)
            .await?;

        // The admissibility decision and the insert must observe the same
        // ledger state; serializable isolation makes concurrent commits
        // against the same principal conflict instead of over-committing.
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let mut line_ids: Vec<Uuid> = vec![principal.id];
        line_ids.extend(installments.iter().map(|line| line.id));

        let prior = payments::Entity::find()
            .filter(payments::Column::SchoolId.eq(input.school_id))
            .filter(payments::Column::StudentId.eq(input.student_id))
            .filter(payments::Column::FeeScheduleId.is_in(line_ids))
            .all(&txn)
            .await?;

        let view = LedgerView::new(
            to_fee_line(&principal),
            installments.iter().map(to_fee_line).collect(),
            sum_paid_by_line(&prior),
        );

        admit_payment(
            &view,
            FeeScheduleId::from_uuid(input.fee_schedule_id),
            input.amount_cents,
        )?;

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            school_id: Set(input.school_id),
            student_id: Set(input.student_id),
            fee_schedule_id: Set(input.fee_schedule_id),
            amount_cents: Set(input.amount_cents),
            method: Set(input.method),
            paid_at: Set(input.paid_at.unwrap_or(now)),
            due_date: Set(input.due_date),
            notes: Set(input.notes),
            recorded_by: Set(input.recorded_by),
            created_at: Set(now),
        };

        let payment = payment.insert(&txn).await?;
        txn.commit().await?;

        info!(
            payment_id = %payment.id,
            student_id = %payment.student_id,
            fee_schedule_id = %payment.fee_schedule_id,
            amount_cents = payment.amount_cents,
            "Payment recorded"
        );

        Ok(PaymentWithContext {
            payment,
            student,
            fee_schedule: target,
        })
    }

    /// Lists payments for a school, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list_payments(
        &self,
        school_id: Uuid,
        filter: PaymentFilter,
        page: &PageRequest,
    ) -> Result<(Vec<payments::Model>, u64), PaymentError> {
        let mut query =
            payments::Entity::find().filter(payments::Column::SchoolId.eq(school_id));

        if let Some(student_id) = filter.student_id {
            query = query.filter(payments::Column::StudentId.eq(student_id));
        }

        if let Some(fee_schedule_id) = filter.fee_schedule_id {
            query = query.filter(payments::Column::FeeScheduleId.eq(fee_schedule_id));
        }

        if let Some(method) = filter.method {
            query = query.filter(payments::Column::Method.eq(method));
        }

        if filter.grade_level_id.is_some() || filter.classroom_id.is_some() {
            let group_ids = self
                .students_in_group(school_id, filter.grade_level_id, filter.classroom_id)
                .await?;
            if group_ids.is_empty() {
                return Ok((Vec::new(), 0));
            }
            query = query.filter(payments::Column::StudentId.is_in(group_ids));
        }

        if let Some(allowed) = filter.restrict_to_students {
            if allowed.is_empty() {
                return Ok((Vec::new(), 0));
            }
            query = query.filter(payments::Column::StudentId.is_in(allowed));
        }

        if let Some(from) = filter.date_from {
            let start = from.and_time(NaiveTime::MIN).and_utc();
            query = query.filter(payments::Column::PaidAt.gte(start));
        }

        if let Some(to) = filter.date_to {
            if let Some(end) = to.checked_add_days(Days::new(1)) {
                let end = end.and_time(NaiveTime::MIN).and_utc();
                query = query.filter(payments::Column::PaidAt.lt(end));
            }
        }

        let total = query.clone().count(&self.db).await?;

        let payments = query
            .order_by_desc(payments::Column::PaidAt)
            .order_by_desc(payments::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((payments, total))
    }

    async fn students_in_group(
        &self,
        school_id: Uuid,
        grade_level_id: Option<Uuid>,
        classroom_id: Option<Uuid>,
    ) -> Result<Vec<Uuid>, DbErr> {
        let mut query =
            students::Entity::find().filter(students::Column::SchoolId.eq(school_id));
        if let Some(grade) = grade_level_id {
            query = query.filter(students::Column::GradeLevelId.eq(grade));
        }
        if let Some(classroom) = classroom_id {
            query = query.filter(students::Column::ClassroomId.eq(classroom));
        }
        let students = query.all(&self.db).await?;
        Ok(students.into_iter().map(|s| s.id).collect())
    }
}

// ============================================================================
// Ledger view construction helpers
// ============================================================================

/// Projects a fee schedule row into the reconciler's line type.
fn to_fee_line(model: &fee_schedules::Model) -> FeeLine {
    FeeLine {
        id: FeeScheduleId::from_uuid(model.id),
        amount_cents: model.amount_cents,
        installment_order: model.installment_order,
        due_date: model.due_date,
    }
}

/// Sums prior payments per fee schedule line.
fn sum_paid_by_line(prior: &[payments::Model]) -> HashMap<FeeScheduleId, i64> {
    let mut paid = HashMap::new();
    for payment in prior {
        *paid
            .entry(FeeScheduleId::from_uuid(payment.fee_schedule_id))
            .or_insert(0) += payment.amount_cents;
    }
    paid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(amount: i64, order: Option<i32>, parent: Option<Uuid>) -> fee_schedules::Model {
        let now = Utc::now().into();
        fee_schedules::Model {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            name: "Tuition".to_string(),
            term: Some("2026 Term 1".to_string()),
            amount_cents: amount,
            is_installment: order.is_some(),
            parent_fee_id: parent,
            installment_order: order,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn payment_row(fee_schedule_id: Uuid, amount: i64) -> payments::Model {
        let now = Utc::now().into();
        payments::Model {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            fee_schedule_id,
            amount_cents: amount,
            method: PaymentMethod::Cash,
            paid_at: now,
            due_date: None,
            notes: None,
            recorded_by: Uuid::new_v4(),
            created_at: now,
        }
    }

    #[test]
    fn test_to_fee_line_projection() {
        let parent = Uuid::new_v4();
        let model = schedule(5_000, Some(2), Some(parent));
        let line = to_fee_line(&model);

        assert_eq!(line.id.into_inner(), model.id);
        assert_eq!(line.amount_cents, 5_000);
        assert_eq!(line.installment_order, Some(2));
    }

    #[test]
    fn test_sum_paid_by_line_groups_payments() {
        let line_a = Uuid::new_v4();
        let line_b = Uuid::new_v4();
        let rows = vec![
            payment_row(line_a, 1_000),
            payment_row(line_a, 2_500),
            payment_row(line_b, 400),
        ];

        let paid = sum_paid_by_line(&rows);
        assert_eq!(paid[&FeeScheduleId::from_uuid(line_a)], 3_500);
        assert_eq!(paid[&FeeScheduleId::from_uuid(line_b)], 400);
        assert_eq!(paid.len(), 2);
    }

    #[test]
    fn test_admission_wiring_rejects_overpayment_via_view() {
        // The repository delegates the decision to the reconciler; this
        // exercises the projection path end to end without a database.
        let principal = schedule(10_000, None, None);
        let prior = vec![payment_row(principal.id, 10_000)];

        let view = LedgerView::new(to_fee_line(&principal), vec![], sum_paid_by_line(&prior));
        let result = admit_payment(&view, FeeScheduleId::from_uuid(principal.id), 1);

        assert_eq!(
            result,
            Err(AdmissionError::GlobalOverpayment { remaining_cents: 0 })
        );
    }
}
