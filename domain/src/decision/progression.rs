//! Round progression planning
//!
//! Validates the votes of a just-completed round before the option set is
//! replaced. Progression is only valid on disagreement: exactly two votes
//! naming exactly two different options.

use super::vote::Vote;
use crate::core::error::DomainError;
use crate::core::ids::{DecisionId, OptionId};

/// The two options that survive into the next round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionPlan {
    pub decision_id: DecisionId,
    /// Round that just ended
    pub from_round: u32,
    /// Surviving options, earliest vote first
    pub survivors: [OptionId; 2],
}

impl ProgressionPlan {
    /// Build a plan from the votes cast in `from_round`.
    pub fn from_votes(
        decision_id: DecisionId,
        from_round: u32,
        votes: &[Vote],
    ) -> Result<Self, DomainError> {
        let [first, second] = votes else {
            return Err(DomainError::WrongVoteCount { found: votes.len() });
        };

        if first.option_id == second.option_id {
            return Err(DomainError::WrongUniqueOptionCount { found: 1 });
        }

        let (earlier, later) = if first.created_at <= second.created_at {
            (first, second)
        } else {
            (second, first)
        };

        Ok(Self {
            decision_id,
            from_round,
            survivors: [earlier.option_id.clone(), later.option_id.clone()],
        })
    }

    /// Round the decision moves to
    pub fn to_round(&self) -> u32 {
        self.from_round + 1
    }
}
