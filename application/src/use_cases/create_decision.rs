//! Create decision use case
//!
//! Opens a decision at round 1 with its initial option set.

use crate::error::DecisionError;
use crate::ports::change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier, NoNotifier};
use crate::ports::decision_store::DecisionStore;
use serde::Serialize;
use std::sync::Arc;
use tandem_domain::{Decision, DecisionKind, DecisionOption, NewDecision, Participants, UserId};
use tracing::info;

/// Input for the CreateDecision use case
#[derive(Debug, Clone)]
pub struct CreateDecisionInput {
    pub kind: DecisionKind,
    pub title: String,
    pub creator: UserId,
    pub partner: UserId,
    pub options: Vec<String>,
}

impl CreateDecisionInput {
    pub fn new(
        kind: DecisionKind,
        title: impl Into<String>,
        creator: impl Into<UserId>,
        partner: impl Into<UserId>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            creator: creator.into(),
            partner: partner.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, title: impl Into<String>) -> Self {
        self.options.push(title.into());
        self
    }

    pub fn with_options<I, T>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.options.extend(titles.into_iter().map(Into::into));
        self
    }
}

/// Output of the CreateDecision use case
#[derive(Debug, Clone, Serialize)]
pub struct CreateDecisionOutput {
    pub decision: Decision,
    pub options: Vec<DecisionOption>,
}

/// Use case for opening a new decision
pub struct CreateDecisionUseCase<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl<S: DecisionStore + ?Sized + 'static> CreateDecisionUseCase<S> {
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

    pub async fn execute(
        &self,
        input: CreateDecisionInput,
    ) -> Result<CreateDecisionOutput, DecisionError> {
        let request = NewDecision::new(
            input.kind,
            input.title,
            Participants::new(input.creator, input.partner),
            input.options.into_iter().map(|o| o.trim().to_string()).collect(),
        );
        request.validate()?;

        let (decision, options) = self.store.insert_decision(&request).await?;
        info!(
            "Created {} decision {} with {} options",
            decision.kind(),
            decision.id(),
            options.len()
        );
        self.notifier.publish(ChangeEvent::decision(
            decision.id(),
            ChangeKind::DecisionCreated,
            &serde_json::json!({ "decision": &decision, "options": &options }),
        ));

        Ok(CreateDecisionOutput { decision, options })
    }
}
