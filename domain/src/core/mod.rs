//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: identifiers for decisions, options and participants
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod ids;
