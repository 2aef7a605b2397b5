//! Composite change notifier: delegates to multiple notifiers.
//!
//! Used to fan change events out to the in-process broadcast channel and
//! the JSONL journal at the same time.
//!
//! ```text
//! CastVoteUseCase ── publish(event) ──▶ CompositeNotifier
//!                                          |
//!                     +--------------------+--------------------+
//!                     |                                         |
//!             BroadcastNotifier                         JsonlChangeJournal
//!             → watchers in this process                → append-only file
//! ```

use super::change_notifier::{ChangeEvent, ChangeNotifier};
use std::sync::Arc;

/// A notifier that delegates to multiple inner notifiers, in order.
#[derive(Default)]
pub struct CompositeNotifier {
    delegates: Vec<Arc<dyn ChangeNotifier>>,
}

impl CompositeNotifier {
    pub fn new(delegates: Vec<Arc<dyn ChangeNotifier>>) -> Self {
        Self { delegates }
    }

    pub fn with(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.delegates.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl ChangeNotifier for CompositeNotifier {
    fn publish(&self, event: ChangeEvent) {
        for d in &self.delegates {
            d.publish(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::change_notifier::{ChangeKind, ChangeTopic};
    use std::sync::Mutex;
    use tandem_domain::DecisionId;

    struct Recording(Mutex<Vec<ChangeKind>>);

    impl ChangeNotifier for Recording {
        fn publish(&self, event: ChangeEvent) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    #[test]
    fn test_composite_fans_out_to_all_delegates() {
        let a = Arc::new(Recording(Mutex::new(Vec::new())));
        let b = Arc::new(Recording(Mutex::new(Vec::new())));
        let composite = CompositeNotifier::default()
            .with(a.clone())
            .with(b.clone());

        composite.publish(ChangeEvent::new(
            ChangeTopic::Decision(DecisionId::new("d1")),
            ChangeKind::DecisionCreated,
            serde_json::Value::Null,
        ));

        assert_eq!(composite.len(), 2);
        assert_eq!(*a.0.lock().unwrap(), vec![ChangeKind::DecisionCreated]);
        assert_eq!(*b.0.lock().unwrap(), vec![ChangeKind::DecisionCreated]);
    }
}
