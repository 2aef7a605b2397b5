//! Domain error types

use super::ids::{DecisionId, OptionId, UserId};
use thiserror::Error;

/// Domain-level errors
///
/// These are contract violations: either a caller asked the engine to do
/// something the protocol does not allow, or a precondition that the
/// orchestrator should already have checked did not hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Expected exactly 2 votes for round progression")]
    WrongVoteCount { found: usize },

    #[error("Expected exactly 2 unique voted options, found {found}")]
    WrongUniqueOptionCount { found: usize },

    #[error("User {0} is not a participant in this decision")]
    NotAParticipant(UserId),

    #[error("Option {0} is not part of the current round")]
    UnknownOption(OptionId),

    #[error("Decision {0} is already completed")]
    DecisionAlreadyCompleted(DecisionId),

    #[error("Decision moved on from round {expected} to round {current}")]
    RoundMoved { expected: u32, current: u32 },

    #[error("The creator cannot vote in the final round")]
    CreatorBlockedInFinalRound,

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),
}

impl DomainError {
    /// Check if this error came from the progression preconditions
    pub fn is_progression_violation(&self) -> bool {
        matches!(
            self,
            DomainError::WrongVoteCount { .. } | DomainError::WrongUniqueOptionCount { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_vote_count_display() {
        let error = DomainError::WrongVoteCount { found: 1 };
        assert_eq!(
            error.to_string(),
            "Expected exactly 2 votes for round progression"
        );
    }

    #[test]
    fn test_wrong_unique_option_count_display() {
        let error = DomainError::WrongUniqueOptionCount { found: 1 };
        assert!(
            error
                .to_string()
                .contains("Expected exactly 2 unique voted options")
        );
    }

    #[test]
    fn test_is_progression_violation() {
        assert!(DomainError::WrongVoteCount { found: 3 }.is_progression_violation());
        assert!(DomainError::WrongUniqueOptionCount { found: 1 }.is_progression_violation());
        assert!(!DomainError::CreatorBlockedInFinalRound.is_progression_violation());
        assert!(
            !DomainError::RoundMoved {
                expected: 1,
                current: 2
            }
            .is_progression_violation()
        );
        assert!(!DomainError::NotAParticipant(UserId::new("mallory")).is_progression_violation());
    }
}
