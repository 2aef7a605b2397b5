//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod change_notifier;
pub mod composite_notifier;
pub mod decision_store;
