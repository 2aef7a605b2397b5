//! Domain layer for tandem
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Decision
//!
//! A joint choice between exactly two participants, the **creator** and the
//! **partner**. It runs one of two protocols:
//!
//! - **Vote**: a single round, completed once both have voted
//! - **Poll**: up to three rounds; disagreement keeps only the two options
//!   that were voted and starts the next round, the partner alone decides
//!   round three
//!
//! ## Ledger and tally
//!
//! Votes are stored one per (decision, participant, round). The tally of a
//! round is always derived from the ledger; the `votes` counter on options
//! is display-only.

pub mod config;
pub mod core;
pub mod decision;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity, StorageBackend};
pub use core::{
    error::DomainError,
    ids::{DecisionId, OptionId, UserId},
};
pub use decision::{
    entities::{
        Decision, DecisionKind, DecisionOption, DecisionStatus, NewDecision, Participants,
        Resolution, Role,
    },
    outcome::{RoundOutcome, resolve_completed_round},
    progression::ProgressionPlan,
    round::{CompletionRule, FINAL_ROUND},
    vote::{BallotSlot, Tally, Vote, sort_newest_first},
};
