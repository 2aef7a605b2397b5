//! In-memory decision store
//!
//! Everything lives behind one `RwLock`; each trait method is a single
//! critical section, which is what makes the upsert and the guarded
//! round/completion writes atomic. The round check and the write it guards
//! happen under the same write lock.

use async_trait::async_trait;
use std::collections::HashMap;
use tandem_application::ports::decision_store::{
    Completion, DecisionStore, RoundAdvance, StoreError,
};
use tandem_domain::{
    BallotSlot, Decision, DecisionId, DecisionOption, DecisionStatus, NewDecision, OptionId,
    Resolution, UserId, Vote, sort_newest_first,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    decisions: HashMap<DecisionId, Decision>,
    /// Insertion order is the listing order
    options: Vec<DecisionOption>,
    votes: HashMap<BallotSlot, Vote>,
}

impl Tables {
    fn decision_mut(&mut self, id: &DecisionId) -> Result<&mut Decision, StoreError> {
        self.decisions
            .get_mut(id)
            .ok_or_else(|| StoreError::missing_decision(id))
    }

    /// Keep the display counter of the current option set in step with the ledger.
    fn shift_counter(&mut self, decision_id: &DecisionId, option_id: &OptionId, up: bool) {
        if let Some(option) = self
            .options
            .iter_mut()
            .find(|o| o.decision_id == *decision_id && o.id == *option_id)
        {
            option.votes = if up {
                option.votes.saturating_add(1)
            } else {
                option.votes.saturating_sub(1)
            };
        }
    }
}

/// Process-local [`DecisionStore`]
#[derive(Default)]
pub struct InMemoryDecisionStore {
    tables: RwLock<Tables>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DecisionStore for InMemoryDecisionStore {
    async fn insert_decision(
        &self,
        request: &NewDecision,
    ) -> Result<(Decision, Vec<DecisionOption>), StoreError> {
        let decision = Decision::open(DecisionId::generate(), request);
        let options: Vec<_> = request
            .options
            .iter()
            .map(|title| DecisionOption::new(decision.id().clone(), title.clone()))
            .collect();

        let mut tables = self.tables.write().await;
        tables
            .decisions
            .insert(decision.id().clone(), decision.clone());
        tables.options.extend(options.iter().cloned());
        Ok((decision, options))
    }

    async fn find_decision(&self, id: &DecisionId) -> Result<Option<Decision>, StoreError> {
        Ok(self.tables.read().await.decisions.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &DecisionId,
        round: u32,
        status: DecisionStatus,
    ) -> Result<Decision, StoreError> {
        let mut tables = self.tables.write().await;
        let decision = tables.decision_mut(id)?;
        if decision.current_round() == round {
            decision.set_status(status);
        }
        Ok(decision.clone())
    }

    async fn complete_decision(
        &self,
        id: &DecisionId,
        round: u32,
        resolution: Resolution,
    ) -> Result<Completion, StoreError> {
        let mut tables = self.tables.write().await;
        let decision = tables.decision_mut(id)?;
        if decision.is_completed() {
            return Ok(Completion::AlreadyCompleted(decision.clone()));
        }
        if decision.current_round() != round {
            return Ok(Completion::Superseded(decision.clone()));
        }
        decision.complete(resolution);
        Ok(Completion::Completed(decision.clone()))
    }

    async fn delete_decision(&self, id: &DecisionId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.decisions.remove(id).is_none() {
            return Err(StoreError::missing_decision(id));
        }
        tables.options.retain(|o| o.decision_id != *id);
        tables.votes.retain(|slot, _| slot.decision_id != *id);
        Ok(())
    }

    async fn list_options(
        &self,
        decision_id: &DecisionId,
    ) -> Result<Vec<DecisionOption>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .options
            .iter()
            .filter(|o| o.decision_id == *decision_id)
            .cloned()
            .collect())
    }

    async fn find_options(
        &self,
        decision_id: &DecisionId,
        ids: &[OptionId],
    ) -> Result<Vec<DecisionOption>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .options
            .iter()
            .filter(|o| o.decision_id == *decision_id && ids.contains(&o.id))
            .cloned()
            .collect())
    }

    async fn replace_options_and_advance(
        &self,
        decision_id: &DecisionId,
        from_round: u32,
        titles: &[String],
    ) -> Result<RoundAdvance, StoreError> {
        let mut tables = self.tables.write().await;
        let decision = tables.decision_mut(decision_id)?;
        if decision.is_completed() || decision.current_round() != from_round {
            return Ok(RoundAdvance::AlreadyAdvanced(decision.clone()));
        }
        decision.advance_round();
        let decision = decision.clone();

        let options: Vec<_> = titles
            .iter()
            .map(|title| DecisionOption::new(decision_id.clone(), title.clone()))
            .collect();
        tables.options.retain(|o| o.decision_id != *decision_id);
        tables.options.extend(options.iter().cloned());

        Ok(RoundAdvance::Advanced { decision, options })
    }

    async fn upsert_vote(
        &self,
        decision_id: &DecisionId,
        user_id: &UserId,
        option_id: &OptionId,
        round: u32,
    ) -> Result<Vote, StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .decision_mut(decision_id)?
            .ensure_open_at(round)
            .map_err(StoreError::Rejected)?;

        let slot = BallotSlot::new(decision_id, user_id, round);
        let previous = tables.votes.get(&slot).map(|v| v.option_id.clone());
        let vote = match tables.votes.get_mut(&slot) {
            Some(existing) => {
                existing.recast(option_id.clone());
                existing.clone()
            }
            None => {
                let vote = Vote::new(
                    decision_id.clone(),
                    user_id.clone(),
                    option_id.clone(),
                    round,
                );
                tables.votes.insert(vote.slot(), vote.clone());
                vote
            }
        };

        if previous.as_ref() != Some(option_id) {
            if let Some(previous) = previous {
                tables.shift_counter(decision_id, &previous, false);
            }
            tables.shift_counter(decision_id, option_id, true);
        }
        Ok(vote)
    }

    async fn list_votes(
        &self,
        decision_id: &DecisionId,
        round: Option<u32>,
    ) -> Result<Vec<Vote>, StoreError> {
        let mut votes: Vec<_> = self
            .tables
            .read()
            .await
            .votes
            .values()
            .filter(|v| v.decision_id == *decision_id && round.is_none_or(|r| v.round == r))
            .cloned()
            .collect();
        sort_newest_first(&mut votes);
        Ok(votes)
    }

    async fn find_vote(
        &self,
        decision_id: &DecisionId,
        user_id: &UserId,
        round: u32,
    ) -> Result<Option<Vote>, StoreError> {
        let slot = BallotSlot::new(decision_id, user_id, round);
        Ok(self.tables.read().await.votes.get(&slot).cloned())
    }
}
