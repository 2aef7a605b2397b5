//! Votes and per-round tallies

use crate::core::ids::{DecisionId, OptionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One participant's current choice for one round of a decision
///
/// There is at most one vote per (decision, user, round). Re-casting
/// replaces `option_id` and bumps `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub decision_id: DecisionId,
    pub user_id: UserId,
    pub option_id: OptionId,
    pub round: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unique key of a vote in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BallotSlot {
    pub decision_id: DecisionId,
    pub user_id: UserId,
    pub round: u32,
}

impl BallotSlot {
    pub fn new(decision_id: &DecisionId, user_id: &UserId, round: u32) -> Self {
        Self {
            decision_id: decision_id.clone(),
            user_id: user_id.clone(),
            round,
        }
    }
}

impl Vote {
    pub fn new(
        decision_id: DecisionId,
        user_id: UserId,
        option_id: OptionId,
        round: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            decision_id,
            user_id,
            option_id,
            round,
            created_at: now,
            updated_at: now,
        }
    }

    /// Key the ledger upserts on
    pub fn slot(&self) -> BallotSlot {
        BallotSlot::new(&self.decision_id, &self.user_id, self.round)
    }

    /// Point the vote at another option
    pub fn recast(&mut self, option_id: OptionId) {
        self.option_id = option_id;
        self.updated_at = Utc::now();
    }
}

/// Sort votes newest first (by update time, then creation time)
pub fn sort_newest_first(votes: &mut [Vote]) {
    votes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Option → vote count for one round
///
/// Options nobody voted for are absent rather than present with 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    counts: BTreeMap<OptionId, usize>,
}

impl Tally {
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut counts = BTreeMap::new();
        for vote in votes {
            *counts.entry(vote.option_id.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, option: &OptionId) -> usize {
        self.counts.get(option).copied().unwrap_or(0)
    }

    /// Number of distinct options that received votes
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total_votes(&self) -> usize {
        self.counts.values().sum()
    }

    /// The single option every vote went to, if there is exactly one
    pub fn unanimous_option(&self) -> Option<&OptionId> {
        if self.counts.len() == 1 {
            self.counts.keys().next()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionId, usize)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }
}
