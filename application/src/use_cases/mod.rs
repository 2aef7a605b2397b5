//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod cast_vote;
pub mod create_decision;
pub mod delete_decision;
pub mod finalize;
pub mod get_decision;
pub mod progress_round;
pub mod round_completion;
pub mod round_tally;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod test_support;
pub mod vote_ledger;
