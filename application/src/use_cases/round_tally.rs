//! Round tally: option → count for one round, read from the vote ledger.

use crate::error::DecisionError;
use crate::ports::decision_store::DecisionStore;
use std::sync::Arc;
use tandem_domain::{DecisionId, Tally};
use tracing::debug;

pub struct RoundTally<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
}

impl<S: DecisionStore + ?Sized + 'static> RoundTally<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn tally(
        &self,
        decision_id: &DecisionId,
        round: u32,
    ) -> Result<Tally, DecisionError> {
        let votes = self.store.list_votes(decision_id, Some(round)).await?;
        let tally = Tally::from_votes(&votes);
        debug!(
            "Tally for decision {} round {}: {} vote(s) on {} option(s)",
            decision_id,
            round,
            tally.total_votes(),
            tally.len()
        );
        Ok(tally)
    }
}
