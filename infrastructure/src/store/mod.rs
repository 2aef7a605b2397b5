//! [`DecisionStore`](tandem_application::DecisionStore) adapters

mod memory;
mod sqlite;

pub use memory::InMemoryDecisionStore;
pub use sqlite::SqliteDecisionStore;
