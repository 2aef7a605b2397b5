//! Change notification adapters
//!
//! Implementations of the [`ChangeNotifier`](tandem_application::ChangeNotifier)
//! port: an in-process broadcast channel and an append-only JSONL journal.

mod broadcast;
mod jsonl_journal;

pub use broadcast::{BroadcastNotifier, DEFAULT_CHANNEL_CAPACITY, TopicSubscription};
pub use jsonl_journal::JsonlChangeJournal;
