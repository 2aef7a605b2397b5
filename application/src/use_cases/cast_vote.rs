//! Cast vote use case (the voting orchestrator)
//!
//! Sequences one participant's vote through the engine:
//!
//! ```text
//! cast_vote ──▶ is_round_complete ──no──▶ status = voted (awaiting partner)
//!                     │
//!                    yes
//!                     ▼
//!              resolve_completed_round
//!                ├── Finalize ──▶ complete_decision          (terminal)
//!                └── Progress ──▶ progress_round, reload     (status = pending)
//! ```
//!
//! The whole sequence runs under a per-decision lock, so two sessions of
//! this process cannot both progress or both finalize. Sessions in other
//! processes are held off by the store: every write carries the round read
//! at the start, and a decision that has moved on rejects the vote and
//! ignores the status and completion writes. Each step commits on its own:
//! a failure half-way leaves earlier steps (usually the vote) in place and
//! the next vote re-runs the check.

use super::finalize::DecisionFinalizer;
use super::progress_round::RoundProgression;
use super::round_completion::RoundCompletionDetector;
use super::round_tally::RoundTally;
use super::shared::{DecisionLocks, RoundVoterCache};
use super::vote_ledger::VoteLedger;
use crate::config::EngineConfig;
use crate::error::DecisionError;
use crate::ports::change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier, NoNotifier};
use crate::ports::decision_store::{Completion, DecisionStore, RoundAdvance};
use serde::Serialize;
use std::sync::Arc;
use tandem_domain::{
    Decision, DecisionId, DecisionOption, DecisionStatus, DomainError, OptionId, Role,
    RoundOutcome, UserId, Vote, resolve_completed_round,
};
use tracing::{debug, info};

/// Input for the CastVote use case
#[derive(Debug, Clone)]
pub struct CastVoteInput {
    pub decision_id: DecisionId,
    pub user_id: UserId,
    pub option_id: OptionId,
}

impl CastVoteInput {
    pub fn new(
        decision_id: impl Into<DecisionId>,
        user_id: impl Into<UserId>,
        option_id: impl Into<OptionId>,
    ) -> Self {
        Self {
            decision_id: decision_id.into(),
            user_id: user_id.into(),
            option_id: option_id.into(),
        }
    }
}

/// What the vote led to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VoteOutcome {
    /// The round is still open; the other participant has to act
    AwaitingPartner,
    /// The poll moved on to a new round with a fresh option set
    AdvancedToRound { round: u32 },
    /// The decision is terminal
    Completed {
        final_decision: OptionId,
        decided_by: UserId,
    },
}

/// Output of the CastVote use case
#[derive(Debug, Clone, Serialize)]
pub struct CastVoteOutput {
    /// The decision as stored after this vote
    pub decision: Decision,
    /// Options of the decision's current round
    pub options: Vec<DecisionOption>,
    /// The vote as recorded
    pub vote: Vote,
    pub outcome: VoteOutcome,
}

/// Use case for casting (or re-casting) a vote on a decision
pub struct CastVoteUseCase<S: DecisionStore + ?Sized + 'static> {
    store: Arc<S>,
    config: EngineConfig,
    notifier: Arc<dyn ChangeNotifier>,
    ledger: VoteLedger<S>,
    detector: RoundCompletionDetector<S>,
    tally: RoundTally<S>,
    progression: RoundProgression<S>,
    finalizer: DecisionFinalizer<S>,
    locks: DecisionLocks,
    voters: RoundVoterCache,
}

impl<S: DecisionStore + ?Sized + 'static> CastVoteUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_parts(store, EngineConfig::default(), Arc::new(NoNotifier))
    }

    pub fn with_config(self, config: EngineConfig) -> Self {
        Self::with_parts(self.store, config, self.notifier)
    }

    pub fn with_notifier(self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self::with_parts(self.store, self.config, notifier)
    }

    fn with_parts(store: Arc<S>, config: EngineConfig, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            ledger: VoteLedger::new(Arc::clone(&store)).with_notifier(Arc::clone(&notifier)),
            detector: RoundCompletionDetector::new(Arc::clone(&store)),
            tally: RoundTally::new(Arc::clone(&store)),
            progression: RoundProgression::new(Arc::clone(&store))
                .with_notifier(Arc::clone(&notifier)),
            finalizer: DecisionFinalizer::new(Arc::clone(&store))
                .with_notifier(Arc::clone(&notifier)),
            store,
            config,
            notifier,
            locks: DecisionLocks::default(),
            voters: RoundVoterCache::default(),
        }
    }

    /// Whether `user_id` has voted in the current round, as seen by this
    /// process. Advisory; the vote ledger is authoritative.
    pub fn has_voted(&self, decision_id: &DecisionId, user_id: &UserId) -> bool {
        self.voters.has_voted(decision_id, user_id)
    }

    /// Execute the use case
    pub async fn execute(&self, input: CastVoteInput) -> Result<CastVoteOutput, DecisionError> {
        let _guard = self.locks.acquire(&input.decision_id).await;

        let decision = self
            .store
            .find_decision(&input.decision_id)
            .await?
            .ok_or_else(|| DecisionError::not_found("decision", &input.decision_id))?;
        let options = self.store.list_options(decision.id()).await?;
        self.check_vote(&decision, &options, &input)?;

        // Step 1: record
        let round = decision.current_round();
        let vote = self
            .ledger
            .cast_vote(decision.id(), &input.option_id, &input.user_id, round)
            .await?;
        self.voters.record(decision.id(), &input.user_id);

        // Step 2: detect
        let participants = decision.participants();
        let complete = self
            .detector
            .is_round_complete(
                decision.id(),
                round,
                &participants.creator,
                &participants.partner,
            )
            .await?;

        // Step 3: wait for the other participant
        if !complete {
            let decision = self
                .store
                .update_status(decision.id(), round, DecisionStatus::Voted)
                .await?;
            // The partner may have closed the round from elsewhere in between
            if let Some(resolution) = decision.resolution() {
                let outcome = VoteOutcome::Completed {
                    final_decision: resolution.final_decision.clone(),
                    decided_by: resolution.decided_by.clone(),
                };
                self.voters.clear(decision.id());
                return Ok(CastVoteOutput {
                    decision,
                    options,
                    vote,
                    outcome,
                });
            }
            if decision.current_round() != round {
                let options = self.store.list_options(decision.id()).await?;
                let outcome = VoteOutcome::AdvancedToRound {
                    round: decision.current_round(),
                };
                self.voters.clear(decision.id());
                return Ok(CastVoteOutput {
                    decision,
                    options,
                    vote,
                    outcome,
                });
            }
            debug!(
                "Decision {} round {} waiting for partner",
                decision.id(),
                round
            );
            self.notifier.publish(ChangeEvent::decision(
                decision.id(),
                ChangeKind::StatusChanged,
                &decision,
            ));
            return Ok(CastVoteOutput {
                decision,
                options,
                vote,
                outcome: VoteOutcome::AwaitingPartner,
            });
        }

        // Step 4: act on the completed round
        let tally = self.tally.tally(decision.id(), round).await?;
        let output = match resolve_completed_round(&decision, &vote, &tally) {
            RoundOutcome::Finalize {
                option_id,
                decided_by,
            } => {
                let completion = self
                    .finalizer
                    .complete_decision(decision.id(), round, &option_id, &decided_by)
                    .await?;
                match completion {
                    Completion::Superseded(decision) => {
                        let options = self.store.list_options(decision.id()).await?;
                        let outcome = VoteOutcome::AdvancedToRound {
                            round: decision.current_round(),
                        };
                        CastVoteOutput {
                            decision,
                            options,
                            vote,
                            outcome,
                        }
                    }
                    Completion::Completed(decision) | Completion::AlreadyCompleted(decision) => {
                        let outcome = match decision.resolution() {
                            Some(resolution) => VoteOutcome::Completed {
                                final_decision: resolution.final_decision.clone(),
                                decided_by: resolution.decided_by.clone(),
                            },
                            None => VoteOutcome::Completed {
                                final_decision: option_id,
                                decided_by,
                            },
                        };
                        CastVoteOutput {
                            decision,
                            options,
                            vote,
                            outcome,
                        }
                    }
                }
            }
            RoundOutcome::Progress => {
                let (decision, options) =
                    match self.progression.progress_round(decision.id(), round).await? {
                        RoundAdvance::Advanced { decision, options } => (decision, options),
                        RoundAdvance::AlreadyAdvanced(decision) => {
                            let options = self.store.list_options(decision.id()).await?;
                            (decision, options)
                        }
                    };
                let outcome = VoteOutcome::AdvancedToRound {
                    round: decision.current_round(),
                };
                CastVoteOutput {
                    decision,
                    options,
                    vote,
                    outcome,
                }
            }
        };

        self.voters.clear(output.decision.id());
        info!(
            "Vote by {} on decision {} -> {:?}",
            input.user_id, input.decision_id, output.outcome
        );
        Ok(output)
    }

    /// The caller-side checks the ledger itself does not make.
    fn check_vote(
        &self,
        decision: &Decision,
        options: &[DecisionOption],
        input: &CastVoteInput,
    ) -> Result<(), DomainError> {
        if decision.is_completed() {
            return Err(DomainError::DecisionAlreadyCompleted(decision.id().clone()));
        }

        let role = decision
            .participants()
            .role_of(&input.user_id)
            .ok_or_else(|| DomainError::NotAParticipant(input.user_id.clone()))?;

        if role == Role::Creator
            && decision.is_final_round()
            && self.config.block_creator_in_final_round
        {
            return Err(DomainError::CreatorBlockedInFinalRound);
        }

        if !options.iter().any(|o| o.id == input.option_id) {
            return Err(DomainError::UnknownOption(input.option_id.clone()));
        }

        Ok(())
    }
}
