//! Fee schedule repository: scoped lookups and per-student statements.

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use scolara_core::fees::{FeeStatus, derive_status};

use crate::entities::{fee_schedules, payments};

/// One fee schedule line enriched with a student's settlement state.
///
/// Status is derived on read from the payment ledger; it is never stored.
#[derive(Debug, Clone)]
pub struct FeeStatementLine {
    /// The fee schedule row.
    pub schedule: fee_schedules::Model,
    /// Sum of the student's payments against this line, in minor units.
    pub amount_paid: i64,
    /// Remaining balance on this line, floored at zero.
    pub remaining_cents: i64,
    /// Derived settlement status.
    pub status: FeeStatus,
}

/// Fee schedule repository for read operations.
#[derive(Debug, Clone)]
pub struct FeeScheduleRepository {
    db: DatabaseConnection,
}

impl FeeScheduleRepository {
    /// Creates a new fee schedule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a fee schedule line by id within a school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        school_id: Uuid,
        fee_schedule_id: Uuid,
    ) -> Result<Option<fee_schedules::Model>, DbErr> {
        fee_schedules::Entity::find_by_id(fee_schedule_id)
            .filter(fee_schedules::Column::SchoolId.eq(school_id))
            .one(&self.db)
            .await
    }

    /// Lists the installments of a principal fee, ordered ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn installments_of(
        &self,
        school_id: Uuid,
        parent_fee_id: Uuid,
    ) -> Result<Vec<fee_schedules::Model>, DbErr> {
        fee_schedules::Entity::find()
            .filter(fee_schedules::Column::SchoolId.eq(school_id))
            .filter(fee_schedules::Column::ParentFeeId.eq(parent_fee_id))
            .order_by_asc(fee_schedules::Column::InstallmentOrder)
            .all(&self.db)
            .await
    }

    /// Builds the fee statement for one student: every schedule line in the
    /// school with the student's paid sum, remaining balance, and derived
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn statement_for_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<FeeStatementLine>, DbErr> {
        let schedules = fee_schedules::Entity::find()
            .filter(fee_schedules::Column::SchoolId.eq(school_id))
            .order_by_asc(fee_schedules::Column::Name)
            .order_by_asc(fee_schedules::Column::InstallmentOrder)
            .all(&self.db)
            .await?;

        let prior = payments::Entity::find()
            .filter(payments::Column::SchoolId.eq(school_id))
            .filter(payments::Column::StudentId.eq(student_id))
            .all(&self.db)
            .await?;

        let mut paid_by_line = std::collections::HashMap::new();
        for payment in &prior {
            *paid_by_line.entry(payment.fee_schedule_id).or_insert(0i64) +=
                payment.amount_cents;
        }

        let today = Utc::now().date_naive();
        let lines = schedules
            .into_iter()
            .map(|schedule| {
                let amount_paid = paid_by_line.get(&schedule.id).copied().unwrap_or(0);
                let remaining_cents = (schedule.amount_cents - amount_paid).max(0);
                let status =
                    derive_status(schedule.amount_cents, amount_paid, schedule.due_date, today);
                FeeStatementLine {
                    schedule,
                    amount_paid,
                    remaining_cents,
                    status,
                }
            })
            .collect();

        Ok(lines)
    }
}
