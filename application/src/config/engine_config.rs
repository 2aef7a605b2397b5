//! Voting engine policy.

/// Policy switches for [`CastVoteUseCase`](crate::use_cases::cast_vote::CastVoteUseCase).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Reject votes from the creator in the final poll round.
    ///
    /// The completion rule for that round accepts any single vote, so
    /// without this gate a creator vote would close the poll.
    pub block_creator_in_final_round: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_creator_in_final_round: true,
        }
    }
}

impl EngineConfig {
    /// Leave the final-round gate to the caller.
    pub fn without_final_round_gate(mut self) -> Self {
        self.block_creator_in_final_round = false;
        self
    }
}
