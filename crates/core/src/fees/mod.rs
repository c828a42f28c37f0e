//! Fee schedules, installment ordering, and payment admission.
//!
//! A principal fee may be split into ordered installments (one level of
//! nesting only). The reconciler admits a payment request against the
//! ledger view of a principal and all of its installments, or rejects it
//! without side effects.

pub mod reconcile;
pub mod schedule;

#[cfg(test)]
mod reconcile_props;

pub use reconcile::{AdmissionError, admit_payment};
pub use schedule::{FeeLine, FeeStatus, LedgerView, derive_status};
