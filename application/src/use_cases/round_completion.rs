//! Round completion detector
//!
//! Reads the voters of a round from the ledger and applies the round's
//! [`CompletionRule`]. Who may vote in the final round is not checked
//! here; that gate sits in the orchestrator.

use crate::error::DecisionError;
use crate::ports::decision_store::DecisionStore;
use std::sync::Arc;
use tandem_domain::{CompletionRule, DecisionId, Participants, UserId};
use tracing::debug;

pub struct RoundCompletionDetector<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
}

impl<S: DecisionStore + ?Sized + 'static> RoundCompletionDetector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn is_round_complete(
        &self,
        decision_id: &DecisionId,
        round: u32,
        creator_id: &UserId,
        partner_id: &UserId,
    ) -> Result<bool, DecisionError> {
        let votes = self.store.list_votes(decision_id, Some(round)).await?;
        let rule = CompletionRule::for_round(round);
        let participants = Participants::new(creator_id.clone(), partner_id.clone());
        let complete = rule.is_satisfied(&participants, votes.iter().map(|v| &v.user_id));

        debug!(
            "Round {} of decision {}: {} vote(s), rule {:?}, complete={}",
            round,
            decision_id,
            votes.len(),
            rule,
            complete
        );
        Ok(complete)
    }
}
