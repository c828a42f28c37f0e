//! Initial database migration.
//!
//! Creates the tenant, student, fee schedule, and payment tables plus the
//! payment method enum. Integrity rules the reconciler relies on live here:
//! positive amounts, the installment shape check, and unique installment
//! orders per principal.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(SCHOOLS_SQL).await?;
        db.execute_unprepared(STUDENTS_SQL).await?;
        db.execute_unprepared(GUARDIAN_LINKS_SQL).await?;

        // ============================================================
        // PART 3: FEE LEDGER
        // ============================================================
        db.execute_unprepared(FEE_SCHEDULES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Payment methods (fixed wire-level set)
CREATE TYPE payment_method AS ENUM (
    'CASH',
    'BANK_TRANSFER',
    'MOBILE_MONEY',
    'CHECK',
    'CARD'
);
";

const SCHOOLS_SQL: &str = r"
CREATE TABLE schools (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const STUDENTS_SQL: &str = r"
CREATE TABLE students (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    -- References into the external academic registry; filter-only.
    grade_level_id UUID,
    classroom_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_students_school ON students(school_id);
CREATE INDEX idx_students_grade ON students(school_id, grade_level_id);
CREATE INDEX idx_students_classroom ON students(school_id, classroom_id);
";

const GUARDIAN_LINKS_SQL: &str = r"
CREATE TABLE guardian_links (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    -- Principal id from the external auth gateway; no local users table.
    guardian_user_id UUID NOT NULL,
    student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT guardian_links_unique UNIQUE (guardian_user_id, student_id)
);

CREATE INDEX idx_guardian_links_guardian ON guardian_links(school_id, guardian_user_id);
";

const FEE_SCHEDULES_SQL: &str = r"
CREATE TABLE fee_schedules (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    term TEXT,
    -- Minor currency units only; no fractional amounts.
    amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
    is_installment BOOLEAN NOT NULL DEFAULT FALSE,
    parent_fee_id UUID REFERENCES fee_schedules(id) ON DELETE CASCADE,
    installment_order INTEGER CHECK (installment_order > 0),
    due_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- A row is either a principal (no parent, no order) or an installment
    -- (both set). One level of nesting only.
    CONSTRAINT fee_schedules_installment_shape CHECK (
        (is_installment AND parent_fee_id IS NOT NULL AND installment_order IS NOT NULL)
        OR (NOT is_installment AND parent_fee_id IS NULL AND installment_order IS NULL)
    ),
    CONSTRAINT fee_schedules_order_unique UNIQUE (parent_fee_id, installment_order)
);

CREATE INDEX idx_fee_schedules_school ON fee_schedules(school_id);
CREATE INDEX idx_fee_schedules_parent ON fee_schedules(parent_fee_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    student_id UUID NOT NULL REFERENCES students(id),
    fee_schedule_id UUID NOT NULL REFERENCES fee_schedules(id),
    amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
    method payment_method NOT NULL,
    paid_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    due_date DATE,
    notes TEXT,
    recorded_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payments_student_fee ON payments(school_id, student_id, fee_schedule_id);
CREATE INDEX idx_payments_paid_at ON payments(school_id, paid_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS fee_schedules;
DROP TABLE IF EXISTS guardian_links;
DROP TABLE IF EXISTS students;
DROP TABLE IF EXISTS schools;
DROP TYPE IF EXISTS payment_method;
";
