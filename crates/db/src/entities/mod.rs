//! `SeaORM` entity definitions.

pub mod fee_schedules;
pub mod guardian_links;
pub mod payments;
pub mod schools;
pub mod sea_orm_active_enums;
pub mod students;
