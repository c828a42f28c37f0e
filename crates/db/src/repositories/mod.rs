//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod fee_schedule;
pub mod payment;
pub mod student;

pub use fee_schedule::{FeeScheduleRepository, FeeStatementLine};
pub use payment::{
    PaymentError, PaymentFilter, PaymentRepository, PaymentWithContext, RecordPaymentInput,
};
pub use student::StudentRepository;
