//! Read a decision together with its current options and round tally.

use super::round_tally::RoundTally;
use crate::error::DecisionError;
use crate::ports::decision_store::DecisionStore;
use serde::Serialize;
use std::sync::Arc;
use tandem_domain::{Decision, DecisionId, DecisionOption, Tally};

/// Everything needed to render a decision
#[derive(Debug, Clone, Serialize)]
pub struct DecisionSnapshot {
    pub decision: Decision,
    pub options: Vec<DecisionOption>,
    /// Votes of the decision's current round
    pub tally: Tally,
}

pub struct GetDecisionUseCase<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
    tally: RoundTally<S>,
}

impl<S: DecisionStore + ?Sized + 'static> GetDecisionUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tally: RoundTally::new(Arc::clone(&store)),
            store,
        }
    }

    pub async fn execute(
        &self,
        decision_id: &DecisionId,
    ) -> Result<DecisionSnapshot, DecisionError> {
        let decision = self
            .store
            .find_decision(decision_id)
            .await?
            .ok_or_else(|| DecisionError::not_found("decision", decision_id))?;
        let options = self.store.list_options(decision_id).await?;
        let tally = self.tally.tally(decision_id, decision.current_round()).await?;

        Ok(DecisionSnapshot {
            decision,
            options,
            tally,
        })
    }
}
