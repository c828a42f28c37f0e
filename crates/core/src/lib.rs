//! Core fee ledger logic for Scolara.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, admission rules, and balance
//! calculations live here.
//!
//! # Modules
//!
//! - `fees` - Fee schedules, installment ordering, and payment admission

pub mod fees;
