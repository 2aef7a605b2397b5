//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tandem_domain::{ConfigIssue, ConfigIssueCode, Severity, StorageBackend};

/// Raw storage configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// "sqlite" or "memory"
    pub backend: String,
    /// SQLite database file; defaults to the platform data directory
    pub path: Option<PathBuf>,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default().as_str().to_string(),
            path: None,
        }
    }
}

impl FileStorageConfig {
    /// Parse `backend`, falling back to sqlite on unknown values.
    pub fn parse_backend(&self) -> (StorageBackend, Vec<ConfigIssue>) {
        match self.backend.parse::<StorageBackend>() {
            Ok(backend) => (backend, vec![]),
            Err(_) => {
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "storage.backend".to_string(),
                        value: self.backend.clone(),
                        valid_values: vec!["sqlite".to_string(), "memory".to_string()],
                    },
                    message: format!(
                        "storage.backend: unknown value '{}', falling back to '{}'",
                        self.backend,
                        StorageBackend::default()
                    ),
                };
                (StorageBackend::default(), vec![issue])
            }
        }
    }

    /// The SQLite file to open: `path` if set, else `<data dir>/tandem/tandem.db`.
    pub fn resolve_path(&self) -> (Option<PathBuf>, Vec<ConfigIssue>) {
        match &self.path {
            Some(path) if path.as_os_str().is_empty() => (None, vec![missing_path()]),
            Some(path) => (Some(path.clone()), vec![]),
            None => match Self::default_database_path() {
                Some(path) => (Some(path), vec![]),
                None => (None, vec![missing_path()]),
            },
        }
    }

    pub fn default_database_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("tandem").join("tandem.db"))
    }
}

fn missing_path() -> ConfigIssue {
    ConfigIssue {
        severity: Severity::Error,
        code: ConfigIssueCode::MissingValue {
            field: "storage.path".to_string(),
        },
        message: "storage.path: no database file configured and no data directory available"
            .to_string(),
    }
}
