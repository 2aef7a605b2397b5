//! Decision finalizer
//!
//! Marks a decision terminal. No policy lives here: which option wins and
//! who is recorded as the decider is decided by the caller.

use crate::error::DecisionError;
use crate::ports::change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier, NoNotifier};
use crate::ports::decision_store::{Completion, DecisionStore};
use std::sync::Arc;
use tandem_domain::{DecisionId, OptionId, Resolution, UserId};
use tracing::{info, warn};

pub struct DecisionFinalizer<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl<S: DecisionStore + ?Sized + 'static> DecisionFinalizer<S> {
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

    /// Set status, final option, decider and decision time in one write,
    /// as the outcome of `round`.
    ///
    /// A decision that is already completed, or no longer at `round`, is
    /// left unchanged.
    pub async fn complete_decision(
        &self,
        decision_id: &DecisionId,
        round: u32,
        final_option_id: &OptionId,
        decided_by: &UserId,
    ) -> Result<Completion, DecisionError> {
        let resolution = Resolution::new(final_option_id.clone(), decided_by.clone());
        let completion = self
            .store
            .complete_decision(decision_id, round, resolution)
            .await?;

        match &completion {
            Completion::Completed(decision) => {
                info!(
                    "Decision {} completed: option {} decided by {}",
                    decision_id, final_option_id, decided_by
                );
                self.notifier.publish(ChangeEvent::decision(
                    decision_id,
                    ChangeKind::DecisionCompleted,
                    decision,
                ));
            }
            Completion::AlreadyCompleted(decision) => {
                warn!(
                    "Decision {} was already completed with option {:?}; keeping it",
                    decision_id,
                    decision.final_decision().map(|o| o.as_str())
                );
            }
            Completion::Superseded(decision) => {
                warn!(
                    "Decision {} moved from round {} to round {}; not finalizing",
                    decision_id,
                    round,
                    decision.current_round()
                );
            }
        }

        Ok(completion)
    }
}
