//! `SeaORM` Entity for payments table.
//!
//! Append-only: rows are created through the payment repository's admission
//! flow and never mutated afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub fee_schedule_id: Uuid,
    /// Amount received, in minor currency units.
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub paid_at: DateTimeWithTimeZone,
    pub due_date: Option<Date>,
    pub notes: Option<String>,
    /// User id from the auth gateway that recorded the payment.
    pub recorded_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schools::Entity",
        from = "Column::SchoolId",
        to = "super::schools::Column::Id"
    )]
    Schools,
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Students,
    #[sea_orm(
        belongs_to = "super::fee_schedules::Entity",
        from = "Column::FeeScheduleId",
        to = "super::fee_schedules::Column::Id"
    )]
    FeeSchedules,
}

impl Related<super::schools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schools.def()
    }
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::fee_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeSchedules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
