//! In-process fan-out of change events over `tokio::sync::broadcast`.

use tandem_application::ports::change_notifier::{ChangeEvent, ChangeNotifier, ChangeTopic};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Buffer used when none is configured
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Publishes every [`ChangeEvent`] to all current subscribers.
///
/// Publishing never blocks and never fails: with no subscribers the event
/// is dropped, and a subscriber that falls more than `capacity` events
/// behind skips ahead.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Receive only the events of one stream (a decision or its votes).
    pub fn subscribe_topic(&self, topic: ChangeTopic) -> TopicSubscription {
        TopicSubscription {
            topic,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn publish(&self, event: ChangeEvent) {
        let kind = event.kind;
        if self.sender.send(event).is_err() {
            trace!("No subscribers for {} event", kind.as_str());
        }
    }
}

/// A receiver filtered to one [`ChangeTopic`]
pub struct TopicSubscription {
    topic: ChangeTopic,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl TopicSubscription {
    pub fn topic(&self) -> &ChangeTopic {
        &self.topic
    }

    /// Next event on this topic, or `None` once the notifier is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.topic == self.topic => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        "Subscriber for {:?} lagged, skipped {} event(s)",
                        self.topic, skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
