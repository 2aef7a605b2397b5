//! Application layer for tandem
//!
//! This crate contains the voting use cases, the ports they talk through,
//! and the engine configuration. It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::DecisionError;
pub use ports::{
    change_notifier::{ChangeEvent, ChangeKind, ChangeNotifier, ChangeTopic, NoNotifier},
    composite_notifier::CompositeNotifier,
    decision_store::{Completion, DecisionStore, RoundAdvance, StoreError},
};
pub use use_cases::cast_vote::{CastVoteInput, CastVoteOutput, CastVoteUseCase, VoteOutcome};
pub use use_cases::create_decision::{
    CreateDecisionInput, CreateDecisionOutput, CreateDecisionUseCase,
};
pub use use_cases::delete_decision::DeleteDecisionUseCase;
pub use use_cases::finalize::DecisionFinalizer;
pub use use_cases::get_decision::{DecisionSnapshot, GetDecisionUseCase};
pub use use_cases::progress_round::RoundProgression;
pub use use_cases::round_completion::RoundCompletionDetector;
pub use use_cases::round_tally::RoundTally;
pub use use_cases::vote_ledger::VoteLedger;
