//! Vote ledger
//!
//! Records one vote per (decision, participant, round). Casting again for
//! the same round overwrites the earlier choice instead of adding a row.
//! The store only accepts votes for the round the decision is currently
//! collecting. The ledger does not check that the voter or the option
//! belong to the decision; that is the orchestrator's job.

use crate::error::DecisionError;
use crate::ports::change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier, NoNotifier};
use crate::ports::decision_store::DecisionStore;
use std::sync::Arc;
use tandem_domain::{DecisionId, OptionId, UserId, Vote};
use tracing::info;

pub struct VoteLedger<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl<S: DecisionStore + ?Sized + 'static> Clone for VoteLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S: DecisionStore + ?Sized + 'static> VoteLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            notifier: Arc::new(NoNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Insert or overwrite the vote of `user_id` for `round`.
    pub async fn cast_vote(
        &self,
        decision_id: &DecisionId,
        option_id: &OptionId,
        user_id: &UserId,
        round: u32,
    ) -> Result<Vote, DecisionError> {
        let vote = self
            .store
            .upsert_vote(decision_id, user_id, option_id, round)
            .await?;

        info!(
            "Vote recorded: decision={} user={} round={} option={}",
            decision_id, user_id, round, option_id
        );
        self.notifier
            .publish(ChangeEvent::votes(decision_id, ChangeKind::VoteCast, &vote));
        Ok(vote)
    }

    /// All votes of a decision, optionally for one round, newest first.
    pub async fn list_votes(
        &self,
        decision_id: &DecisionId,
        round: Option<u32>,
    ) -> Result<Vec<Vote>, DecisionError> {
        Ok(self.store.list_votes(decision_id, round).await?)
    }

    pub async fn get_vote(
        &self,
        decision_id: &DecisionId,
        user_id: &UserId,
        round: u32,
    ) -> Result<Option<Vote>, DecisionError> {
        Ok(self.store.find_vote(decision_id, user_id, round).await?)
    }
}
