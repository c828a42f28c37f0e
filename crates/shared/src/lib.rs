//! Shared types, auth claims, and configuration for Scolara.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Integer money helpers (minor currency units only)
//! - JWT claims, roles, and the access-gate check
//! - Pagination types for list endpoints
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::{Claims, Role};
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
