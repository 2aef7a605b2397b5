//! Test doubles for the voting use cases.

use crate::ports::change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier};
use crate::ports::decision_store::{Completion, DecisionStore, RoundAdvance, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tandem_domain::{
    BallotSlot, Decision, DecisionId, DecisionOption, DecisionStatus, NewDecision, OptionId,
    Resolution, UserId, Vote, sort_newest_first,
};
use tokio::sync::Notify;

#[derive(Default)]
struct Tables {
    decisions: HashMap<DecisionId, Decision>,
    options: Vec<DecisionOption>,
    votes: Vec<Vote>,
}

impl Tables {
    fn decision_mut(&mut self, id: &DecisionId) -> Result<&mut Decision, StoreError> {
        self.decisions
            .get_mut(id)
            .ok_or_else(|| StoreError::missing_decision(id))
    }
}

/// Holds one store call until the test releases it.
#[derive(Default)]
pub(crate) struct Gate {
    reached: Notify,
    release: Notify,
}

impl Gate {
    /// Wait until the paused call has started.
    pub(crate) async fn reached(&self) {
        self.reached.notified().await;
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }
}

/// Minimal in-test store that records calls and can be told to fail.
#[derive(Default)]
pub(crate) struct FakeStore {
    tables: Mutex<Tables>,
    fail_on: Mutex<Option<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
    gates: Mutex<HashMap<&'static str, Arc<Gate>>>,
}

impl FakeStore {
    /// Make every later call of `operation` fail with a query error.
    pub(crate) fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().unwrap() = Some(operation);
    }

    pub(crate) fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub(crate) fn vote_rows(&self) -> Vec<Vote> {
        self.tables.lock().unwrap().votes.clone()
    }

    pub(crate) fn option_rows(&self, decision_id: &DecisionId) -> Vec<DecisionOption> {
        self.tables
            .lock()
            .unwrap()
            .options
            .iter()
            .filter(|o| o.decision_id == *decision_id)
            .cloned()
            .collect()
    }

    /// Write a vote row directly, bypassing the upsert key and round guard.
    pub(crate) fn push_raw_vote(&self, vote: Vote) {
        self.tables.lock().unwrap().votes.push(vote);
    }

    /// Pause the next call of `operation` before it touches the tables.
    pub(crate) fn pause_next(&self, operation: &'static str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .unwrap()
            .insert(operation, Arc::clone(&gate));
        gate
    }

    async fn wait_at(&self, operation: &'static str) {
        let gate = self.gates.lock().unwrap().remove(operation);
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.release.notified().await;
        }
    }

    fn enter(&self, operation: &'static str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(operation);
        if *self.fail_on.lock().unwrap() == Some(operation) {
            return Err(StoreError::Query(format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl DecisionStore for FakeStore {
    async fn insert_decision(
        &self,
        request: &NewDecision,
    ) -> Result<(Decision, Vec<DecisionOption>), StoreError> {
        self.enter("insert_decision")?;
        let decision = Decision::open(DecisionId::generate(), request);
        let options: Vec<_> = request
            .options
            .iter()
            .map(|title| DecisionOption::new(decision.id().clone(), title.clone()))
            .collect();
        let mut tables = self.tables.lock().unwrap();
        tables
            .decisions
            .insert(decision.id().clone(), decision.clone());
        tables.options.extend(options.iter().cloned());
        Ok((decision, options))
    }

    async fn find_decision(&self, id: &DecisionId) -> Result<Option<Decision>, StoreError> {
        self.enter("find_decision")?;
        Ok(self.tables.lock().unwrap().decisions.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &DecisionId,
        round: u32,
        status: DecisionStatus,
    ) -> Result<Decision, StoreError> {
        self.enter("update_status")?;
        self.wait_at("update_status").await;
        let mut tables = self.tables.lock().unwrap();
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
        self.enter("complete_decision")?;
        let mut tables = self.tables.lock().unwrap();
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
        self.enter("delete_decision")?;
        let mut tables = self.tables.lock().unwrap();
        tables
            .decisions
            .remove(id)
            .ok_or_else(|| StoreError::missing_decision(id))?;
        tables.options.retain(|o| o.decision_id != *id);
        tables.votes.retain(|v| v.decision_id != *id);
        Ok(())
    }

    async fn list_options(
        &self,
        decision_id: &DecisionId,
    ) -> Result<Vec<DecisionOption>, StoreError> {
        self.enter("list_options")?;
        Ok(self.option_rows(decision_id))
    }

    async fn find_options(
        &self,
        decision_id: &DecisionId,
        ids: &[OptionId],
    ) -> Result<Vec<DecisionOption>, StoreError> {
        self.enter("find_options")?;
        Ok(self
            .option_rows(decision_id)
            .into_iter()
            .filter(|o| ids.contains(&o.id))
            .collect())
    }

    async fn replace_options_and_advance(
        &self,
        decision_id: &DecisionId,
        from_round: u32,
        titles: &[String],
    ) -> Result<RoundAdvance, StoreError> {
        self.enter("replace_options_and_advance")?;
        let mut tables = self.tables.lock().unwrap();
        let decision = tables.decision_mut(decision_id)?;
        if decision.is_completed() || decision.current_round() != from_round {
            return Ok(RoundAdvance::AlreadyAdvanced(decision.clone()));
        }
        decision.advance_round();
        let decision = decision.clone();

        tables.options.retain(|o| o.decision_id != *decision_id);
        let options: Vec<_> = titles
            .iter()
            .map(|t| DecisionOption::new(decision_id.clone(), t.clone()))
            .collect();
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
        self.enter("upsert_vote")?;
        self.wait_at("upsert_vote").await;
        let mut tables = self.tables.lock().unwrap();
        tables
            .decision_mut(decision_id)?
            .ensure_open_at(round)
            .map_err(StoreError::Rejected)?;

        let slot = BallotSlot::new(decision_id, user_id, round);
        if let Some(existing) = tables.votes.iter_mut().find(|v| v.slot() == slot) {
            existing.recast(option_id.clone());
            return Ok(existing.clone());
        }
        let vote = Vote::new(
            decision_id.clone(),
            user_id.clone(),
            option_id.clone(),
            round,
        );
        tables.votes.push(vote.clone());
        Ok(vote)
    }

    async fn list_votes(
        &self,
        decision_id: &DecisionId,
        round: Option<u32>,
    ) -> Result<Vec<Vote>, StoreError> {
        self.enter("list_votes")?;
        let mut votes: Vec<_> = self
            .vote_rows()
            .into_iter()
            .filter(|v| v.decision_id == *decision_id && round.is_none_or(|r| v.round == r))
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
        self.enter("find_vote")?;
        let slot = BallotSlot::new(decision_id, user_id, round);
        Ok(self.vote_rows().into_iter().find(|v| v.slot() == slot))
    }
}

/// Notifier that remembers the kinds of every published event.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingNotifier {
    pub(crate) fn kinds(&self) -> Vec<ChangeKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn publish(&self, event: ChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}
