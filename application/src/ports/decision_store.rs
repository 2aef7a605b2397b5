//! Decision store port
//!
//! Defines the persistence contract for decisions, their options and the
//! vote ledger. Implementations (adapters) live in the infrastructure layer.
//!
//! Besides plain reads and writes, the port exposes the three primitives
//! that have to be atomic for two unsynchronized participants to be safe:
//!
//! - [`DecisionStore::upsert_vote`]: one row per (decision, user, round),
//!   written only while the decision is open at that round
//! - [`DecisionStore::replace_options_and_advance`]: guarded by the round
//!   the caller expects to leave
//! - [`DecisionStore::complete_decision`]: guarded by the round being
//!   resolved; a no-op once completed
//!
//! Each guard reads the decision row inside the same transaction as the
//! write, so a caller acting on a stale read can never touch a round that
//! another session already closed.

use async_trait::async_trait;
use tandem_domain::{
    Decision, DecisionId, DecisionOption, DecisionStatus, DomainError, NewDecision, OptionId,
    Resolution, UserId, Vote,
};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("{table} not found: {id}")]
    MissingRow { table: &'static str, id: String },

    #[error("Corrupt {table} row: {reason}")]
    Corrupt { table: &'static str, reason: String },

    /// The decision no longer accepts this write (completed, or moved on
    /// from the round the caller read)
    #[error(transparent)]
    Rejected(DomainError),

    #[error("Other error: {0}")]
    Other(String),
}

impl StoreError {
    pub fn missing_decision(id: &DecisionId) -> Self {
        StoreError::MissingRow {
            table: "decision",
            id: id.to_string(),
        }
    }
}

/// Result of a guarded round advance
#[derive(Debug, Clone)]
pub enum RoundAdvance {
    /// The option set was replaced and the round counter incremented
    Advanced {
        decision: Decision,
        options: Vec<DecisionOption>,
    },
    /// The decision had already left the expected round; nothing changed
    AlreadyAdvanced(Decision),
}

impl RoundAdvance {
    pub fn decision(&self) -> &Decision {
        match self {
            RoundAdvance::Advanced { decision, .. } => decision,
            RoundAdvance::AlreadyAdvanced(decision) => decision,
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, RoundAdvance::Advanced { .. })
    }
}

/// Result of a guarded finalization
#[derive(Debug, Clone)]
pub enum Completion {
    /// The resolution was written
    Completed(Decision),
    /// The decision was already completed; the stored resolution is kept
    AlreadyCompleted(Decision),
    /// The decision left the round being resolved; nothing changed
    Superseded(Decision),
}

impl Completion {
    pub fn into_decision(self) -> Decision {
        match self {
            Completion::Completed(decision)
            | Completion::AlreadyCompleted(decision)
            | Completion::Superseded(decision) => decision,
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, Completion::Completed(_))
    }
}

/// Persistence for decisions, options and votes
#[async_trait]
pub trait DecisionStore: Send + Sync {
    // ==================== Decisions ====================

    /// Insert a decision at round 1 together with its options, in one
    /// transaction. The store assigns all ids.
    async fn insert_decision(
        &self,
        request: &NewDecision,
    ) -> Result<(Decision, Vec<DecisionOption>), StoreError>;

    async fn find_decision(&self, id: &DecisionId) -> Result<Option<Decision>, StoreError>;

    /// Set a non-terminal status while the decision is still open at
    /// `round`. Otherwise the decision is returned unchanged.
    async fn update_status(
        &self,
        id: &DecisionId,
        round: u32,
        status: DecisionStatus,
    ) -> Result<Decision, StoreError>;

    /// Record the terminal outcome of `round`. Reports
    /// [`Completion::AlreadyCompleted`] or [`Completion::Superseded`] and
    /// changes nothing when the decision is completed or past `round`.
    async fn complete_decision(
        &self,
        id: &DecisionId,
        round: u32,
        resolution: Resolution,
    ) -> Result<Completion, StoreError>;

    /// Delete a decision with its options and votes, in one transaction.
    async fn delete_decision(&self, id: &DecisionId) -> Result<(), StoreError>;

    // ==================== Options ====================

    /// All current options of a decision, in insertion order
    async fn list_options(&self, decision_id: &DecisionId)
    -> Result<Vec<DecisionOption>, StoreError>;

    /// The options of a decision whose ids are in `ids`
    async fn find_options(
        &self,
        decision_id: &DecisionId,
        ids: &[OptionId],
    ) -> Result<Vec<DecisionOption>, StoreError>;

    /// In one transaction: if the decision is still at `from_round` and not
    /// completed, delete all its options, insert one fresh option per title
    /// and increment the round (status back to pending). Otherwise do
    /// nothing and report [`RoundAdvance::AlreadyAdvanced`].
    async fn replace_options_and_advance(
        &self,
        decision_id: &DecisionId,
        from_round: u32,
        titles: &[String],
    ) -> Result<RoundAdvance, StoreError>;

    // ==================== Votes ====================

    /// Insert or overwrite the vote keyed by (decision, user, round) in a
    /// single atomic step.
    ///
    /// Fails with [`StoreError::Rejected`] and writes nothing unless the
    /// decision is open at `round`, so finished rounds stay as history.
    async fn upsert_vote(
        &self,
        decision_id: &DecisionId,
        user_id: &UserId,
        option_id: &OptionId,
        round: u32,
    ) -> Result<Vote, StoreError>;

    /// Votes of a decision, optionally limited to one round, newest first
    async fn list_votes(
        &self,
        decision_id: &DecisionId,
        round: Option<u32>,
    ) -> Result<Vec<Vote>, StoreError>;

    async fn find_vote(
        &self,
        decision_id: &DecisionId,
        user_id: &UserId,
        round: u32,
    ) -> Result<Option<Vote>, StoreError>;
}
