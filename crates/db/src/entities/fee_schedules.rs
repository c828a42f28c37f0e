//! `SeaORM` Entity for fee_schedules table.
//!
//! A row is either a principal fee (`is_installment = false`) or one
//! installment of a principal (`parent_fee_id` + `installment_order` set).
//! One level of nesting only, enforced by a table CHECK constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fee_schedules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub term: Option<String>,
    /// Amount owed, in minor currency units.
    pub amount_cents: i64,
    pub is_installment: bool,
    pub parent_fee_id: Option<Uuid>,
    pub installment_order: Option<i32>,
    pub due_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schools::Entity",
        from = "Column::SchoolId",
        to = "super::schools::Column::Id"
    )]
    Schools,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::schools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schools.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
