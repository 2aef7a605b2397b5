//! Port for announcing row-level changes to watchers.
//!
//! Other sessions watching a decision refresh when they see an event. The
//! engine never depends on delivery: any client can re-read the store to
//! recover the current state, so `publish` is synchronous and infallible.

use serde::Serialize;
use serde_json::Value;
use tandem_domain::DecisionId;

/// Stream a change belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "stream", content = "decision_id", rename_all = "snake_case")]
pub enum ChangeTopic {
    /// The decision row and its options
    Decision(DecisionId),
    /// The vote ledger of a decision
    Votes(DecisionId),
}

impl ChangeTopic {
    pub fn decision_id(&self) -> &DecisionId {
        match self {
            ChangeTopic::Decision(id) | ChangeTopic::Votes(id) => id,
        }
    }
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    DecisionCreated,
    VoteCast,
    StatusChanged,
    RoundAdvanced,
    DecisionCompleted,
    DecisionDeleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::DecisionCreated => "decision_created",
            ChangeKind::VoteCast => "vote_cast",
            ChangeKind::StatusChanged => "status_changed",
            ChangeKind::RoundAdvanced => "round_advanced",
            ChangeKind::DecisionCompleted => "decision_completed",
            ChangeKind::DecisionDeleted => "decision_deleted",
        }
    }
}

/// A change announcement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub topic: ChangeTopic,
    pub kind: ChangeKind,
    /// JSON payload with event-specific data (usually the changed row).
    pub payload: Value,
}

impl ChangeEvent {
    pub fn new(topic: ChangeTopic, kind: ChangeKind, payload: Value) -> Self {
        Self {
            topic,
            kind,
            payload,
        }
    }

    /// Event on the decision stream, with the row serialized as payload.
    pub fn decision(id: &DecisionId, kind: ChangeKind, row: &impl Serialize) -> Self {
        Self::new(
            ChangeTopic::Decision(id.clone()),
            kind,
            serde_json::to_value(row).unwrap_or(Value::Null),
        )
    }

    /// Event on the vote stream, with the row serialized as payload.
    pub fn votes(id: &DecisionId, kind: ChangeKind, row: &impl Serialize) -> Self {
        Self::new(
            ChangeTopic::Votes(id.clone()),
            kind,
            serde_json::to_value(row).unwrap_or(Value::Null),
        )
    }
}

/// Port for publishing change events.
pub trait ChangeNotifier: Send + Sync {
    /// Announce a change. Must not block on slow watchers.
    fn publish(&self, event: ChangeEvent);
}

/// No-op implementation for tests and when nobody is watching.
pub struct NoNotifier;

impl ChangeNotifier for NoNotifier {
    fn publish(&self, _event: ChangeEvent) {}
}
