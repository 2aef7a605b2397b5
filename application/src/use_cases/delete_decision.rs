//! Delete decision use case
//!
//! Removes a decision together with its options and votes.

use crate::error::DecisionError;
use crate::ports::change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier, NoNotifier};
use crate::ports::decision_store::DecisionStore;
use std::sync::Arc;
use tandem_domain::DecisionId;
use tracing::info;

pub struct DeleteDecisionUseCase<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl<S: DecisionStore + ?Sized + 'static> DeleteDecisionUseCase<S> {
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

    pub async fn execute(&self, decision_id: &DecisionId) -> Result<(), DecisionError> {
        self.store.delete_decision(decision_id).await?;
        info!("Deleted decision {}", decision_id);
        self.notifier.publish(ChangeEvent::decision(
            decision_id,
            ChangeKind::DecisionDeleted,
            &serde_json::json!({ "id": decision_id }),
        ));
        Ok(())
    }
}
