//! Round progression / elimination
//!
//! On a completed, non-final poll round where the two participants chose
//! different options, the whole option set is replaced by fresh copies of
//! the two voted options and the round counter moves on. Votes of the
//! finished round stay in the ledger as history.
//!
//! The preconditions are checked again here even though the orchestrator
//! only calls this on disagreement; a failed check changes nothing.

use crate::error::DecisionError;
use crate::ports::change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier, NoNotifier};
use crate::ports::decision_store::{DecisionStore, RoundAdvance};
use std::sync::Arc;
use tandem_domain::{DecisionId, ProgressionPlan};
use tracing::{info, warn};

pub struct RoundProgression<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl<S: DecisionStore + ?Sized + 'static> RoundProgression<S> {
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

    /// Eliminate down to the two voted options and advance past `current_round`.
    ///
    /// A decision that already left `current_round` (a concurrent session
    /// got there first) is returned as [`RoundAdvance::AlreadyAdvanced`].
    pub async fn progress_round(
        &self,
        decision_id: &DecisionId,
        current_round: u32,
    ) -> Result<RoundAdvance, DecisionError> {
        let decision = self
            .store
            .find_decision(decision_id)
            .await?
            .ok_or_else(|| DecisionError::not_found("decision", decision_id))?;

        if decision.is_completed() || decision.current_round() > current_round {
            warn!(
                "Decision {} already past round {} (now round {}, {}); skipping progression",
                decision_id,
                current_round,
                decision.current_round(),
                decision.status()
            );
            return Ok(RoundAdvance::AlreadyAdvanced(decision));
        }

        let votes = self
            .store
            .list_votes(decision_id, Some(current_round))
            .await?;
        let plan = ProgressionPlan::from_votes(decision_id.clone(), current_round, &votes)?;

        let rows = self
            .store
            .find_options(decision_id, &plan.survivors)
            .await?;
        let titles = plan
            .survivors
            .iter()
            .map(|id| {
                rows.iter()
                    .find(|o| o.id == *id)
                    .map(|o| o.title.clone())
                    .ok_or_else(|| DecisionError::not_found("option", id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let advance = self
            .store
            .replace_options_and_advance(decision_id, current_round, &titles)
            .await?;

        match &advance {
            RoundAdvance::Advanced { decision, options } => {
                info!(
                    "Decision {} advanced to round {} with options [{}]",
                    decision_id,
                    plan.to_round(),
                    titles.join(", ")
                );
                self.notifier.publish(ChangeEvent::decision(
                    decision_id,
                    ChangeKind::RoundAdvanced,
                    &serde_json::json!({ "decision": decision, "options": options }),
                ));
            }
            RoundAdvance::AlreadyAdvanced(_) => {
                warn!(
                    "Decision {} left round {} concurrently; progression was a no-op",
                    decision_id, current_round
                );
            }
        }

        Ok(advance)
    }
}
