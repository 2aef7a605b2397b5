//! Append-only JSONL journal of change events.
//!
//! Each [`ChangeEvent`] becomes one JSON line carrying `type`, `timestamp`,
//! the stream it belongs to and the changed row under `data`. The file is
//! opened in append mode so a journal survives across invocations.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tandem_application::ports::change_notifier::{ChangeEvent, ChangeNotifier};
use tracing::warn;

/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on `Drop`.
pub struct JsonlChangeJournal {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlChangeJournal {
    /// Open the journal at `path`, creating it (and parent directories) if needed.
    ///
    /// Returns `None` if the file cannot be opened; callers run without a journal.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create change journal directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open change journal {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChangeNotifier for JsonlChangeJournal {
    fn publish(&self, event: ChangeEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let record = serde_json::json!({
            "type": event.kind,
            "timestamp": timestamp,
            "topic": event.topic,
            "data": event.payload,
        });

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                warn!("Could not write change journal {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for JsonlChangeJournal {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
