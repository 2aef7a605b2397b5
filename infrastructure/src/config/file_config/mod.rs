//! Raw TOML configuration data types
//!
//! These structs mirror the TOML file. String-typed enum fields are parsed
//! later so a bad value becomes a [`ConfigIssue`] instead of a load error.

mod engine;
mod notifications;
mod output;
mod storage;

pub use engine::FileEngineConfig;
pub use notifications::FileNotificationsConfig;
pub use output::FileOutputConfig;
pub use storage::FileStorageConfig;

use serde::{Deserialize, Serialize};
use tandem_domain::ConfigIssue;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub storage: FileStorageConfig,
    pub engine: FileEngineConfig,
    pub notifications: FileNotificationsConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks the storage backend name, that a SQLite backend has a
    /// database file, and the broadcast channel capacity.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let (backend, backend_issues) = self.storage.parse_backend();
        issues.extend(backend_issues);
        if backend == tandem_domain::StorageBackend::Sqlite {
            issues.extend(self.storage.resolve_path().1);
        }

        issues.extend(self.notifications.capacity().1);

        issues
    }
}
