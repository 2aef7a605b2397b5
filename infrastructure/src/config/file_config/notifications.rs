//! Notification configuration from TOML (`[notifications]` section)

use crate::notify::DEFAULT_CHANNEL_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tandem_domain::{ConfigIssue, ConfigIssueCode, Severity};

/// Raw notification configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNotificationsConfig {
    /// Buffer of the in-process broadcast channel
    pub channel_capacity: usize,
    /// Append change events to this JSONL file
    pub journal: Option<PathBuf>,
}

impl Default for FileNotificationsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            journal: None,
        }
    }
}

impl FileNotificationsConfig {
    /// Usable channel capacity; zero falls back to the default.
    pub fn capacity(&self) -> (usize, Vec<ConfigIssue>) {
        if self.channel_capacity > 0 {
            return (self.channel_capacity, vec![]);
        }
        let issue = ConfigIssue {
            severity: Severity::Warning,
            code: ConfigIssueCode::OutOfRange {
                field: "notifications.channel_capacity".to_string(),
            },
            message: format!(
                "notifications.channel_capacity: must be at least 1, using {}",
                DEFAULT_CHANNEL_CAPACITY
            ),
        };
        (DEFAULT_CHANNEL_CAPACITY, vec![issue])
    }
}
