//! Round completion rules
//!
//! The one asymmetry of the whole protocol lives here: the final poll round
//! closes on a single vote (the creator sits it out), every other round
//! needs both participants.

use super::entities::Participants;
use crate::core::ids::UserId;
use serde::{Deserialize, Serialize};

/// Last round of a poll decision
pub const FINAL_ROUND: u32 = 3;

/// What it takes for a round to be complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionRule {
    /// Both the creator and the partner must have voted
    BothParticipants,
    /// Any single vote closes the round
    AnyVote,
}

impl CompletionRule {
    /// Rule for a round number. Vote decisions only ever use round 1.
    pub fn for_round(round: u32) -> Self {
        if round >= FINAL_ROUND {
            CompletionRule::AnyVote
        } else {
            CompletionRule::BothParticipants
        }
    }

    /// Check the rule against the ids of everyone who voted in the round.
    ///
    /// Identity matters, not count: two entries for the creator do not
    /// stand in for the partner.
    pub fn is_satisfied<'a>(
        &self,
        participants: &Participants,
        voters: impl IntoIterator<Item = &'a UserId>,
    ) -> bool {
        match self {
            CompletionRule::AnyVote => voters.into_iter().next().is_some(),
            CompletionRule::BothParticipants => {
                let (mut creator, mut partner) = (false, false);
                for voter in voters {
                    creator |= *voter == participants.creator;
                    partner |= *voter == participants.partner;
                }
                creator && partner
            }
        }
    }
}
