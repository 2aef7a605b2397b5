//! Infrastructure layer for tandem
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod notify;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileEngineConfig, FileNotificationsConfig, FileOutputConfig,
    FileStorageConfig,
};
pub use notify::{BroadcastNotifier, JsonlChangeJournal, TopicSubscription};
pub use store::{InMemoryDecisionStore, SqliteDecisionStore};

#[cfg(test)]
mod scenarios;
