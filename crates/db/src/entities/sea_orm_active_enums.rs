//! `SeaORM` active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a payment was received. Fixed wire-level set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash at the school office.
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// Bank transfer.
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    /// Mobile money wallet.
    #[sea_orm(string_value = "MOBILE_MONEY")]
    MobileMoney,
    /// Paper check.
    #[sea_orm(string_value = "CHECK")]
    Check,
    /// Debit or credit card.
    #[sea_orm(string_value = "CARD")]
    Card,
}
