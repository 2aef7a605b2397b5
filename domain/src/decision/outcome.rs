//! What a completed round leads to

use super::entities::{Decision, DecisionKind};
use super::vote::{Tally, Vote};
use crate::core::ids::{OptionId, UserId};
use serde::Serialize;

/// Next step after a round has been detected as complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Terminal: record `option_id` as the final decision
    Finalize {
        option_id: OptionId,
        decided_by: UserId,
    },
    /// Disagreement before the final round: eliminate and advance
    Progress,
}

/// Decide what a completed round leads to.
///
/// `trigger` is the vote whose cast caused the completion check. In vote
/// mode the trigger's option is recorded as is, even when the two
/// participants picked different options.
pub fn resolve_completed_round(decision: &Decision, trigger: &Vote, tally: &Tally) -> RoundOutcome {
    let finalize = |option_id: &OptionId| RoundOutcome::Finalize {
        option_id: option_id.clone(),
        decided_by: trigger.user_id.clone(),
    };

    match decision.kind() {
        DecisionKind::Vote => finalize(&trigger.option_id),
        DecisionKind::Poll if decision.is_final_round() => {
            finalize(tally.unanimous_option().unwrap_or(&trigger.option_id))
        }
        DecisionKind::Poll => match tally.unanimous_option() {
            Some(option) => finalize(option),
            None => RoundOutcome::Progress,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::DecisionId;
    use crate::decision::entities::{NewDecision, Participants};

    fn decision(kind: DecisionKind, round: u32) -> Decision {
        let mut d = Decision::open(
            DecisionId::new("d1"),
            &NewDecision::new(
                kind,
                "Dinner",
                Participants::new("alice", "bob"),
                vec!["a".to_string(), "b".to_string()],
            ),
        );
        for _ in 1..round {
            d.advance_round();
        }
        d
    }

    fn vote(user: &str, option: &str, round: u32) -> Vote {
        Vote::new(
            DecisionId::new("d1"),
            UserId::new(user),
            OptionId::new(option),
            round,
        )
    }

    #[test]
    fn test_vote_mode_records_trigger_option_on_disagreement() {
        let first = vote("alice", "x", 1);
        let trigger = vote("bob", "y", 1);
        let tally = Tally::from_votes([&first, &trigger]);

        let outcome = resolve_completed_round(&decision(DecisionKind::Vote, 1), &trigger, &tally);
        assert_eq!(
            outcome,
            RoundOutcome::Finalize {
                option_id: OptionId::new("y"),
                decided_by: UserId::new("bob"),
            }
        );
    }

    #[test]
    fn test_poll_agreement_finalizes_early() {
        let first = vote("alice", "comedy", 1);
        let trigger = vote("bob", "comedy", 1);
        let tally = Tally::from_votes([&first, &trigger]);

        let outcome = resolve_completed_round(&decision(DecisionKind::Poll, 1), &trigger, &tally);
        assert_eq!(
            outcome,
            RoundOutcome::Finalize {
                option_id: OptionId::new("comedy"),
                decided_by: UserId::new("bob"),
            }
        );
    }

    #[test]
    fn test_poll_disagreement_progresses() {
        let first = vote("alice", "action", 2);
        let trigger = vote("bob", "drama", 2);
        let tally = Tally::from_votes([&first, &trigger]);

        let outcome = resolve_completed_round(&decision(DecisionKind::Poll, 2), &trigger, &tally);
        assert_eq!(outcome, RoundOutcome::Progress);
    }

    #[test]
    fn test_final_round_always_finalizes() {
        let trigger = vote("bob", "action", 3);
        let tally = Tally::from_votes([&trigger]);

        let outcome = resolve_completed_round(&decision(DecisionKind::Poll, 3), &trigger, &tally);
        assert_eq!(
            outcome,
            RoundOutcome::Finalize {
                option_id: OptionId::new("action"),
                decided_by: UserId::new("bob"),
            }
        );
    }

    #[test]
    fn test_final_round_with_two_options_uses_trigger() {
        let other = vote("alice", "drama", 3);
        let trigger = vote("bob", "action", 3);
        let tally = Tally::from_votes([&other, &trigger]);

        let outcome = resolve_completed_round(&decision(DecisionKind::Poll, 3), &trigger, &tally);
        assert!(matches!(
            outcome,
            RoundOutcome::Finalize { option_id, .. } if option_id == OptionId::new("action")
        ));
    }
}
