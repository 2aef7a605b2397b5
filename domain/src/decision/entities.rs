//! Decision domain entities

use crate::core::error::DomainError;
use crate::core::ids::{DecisionId, OptionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The agreement protocol a decision runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    /// Single round, first-to-agreement
    Vote,
    /// Up to three rounds with elimination
    Poll,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Vote => "vote",
            DecisionKind::Poll => "poll",
        }
    }
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DecisionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vote" => Ok(DecisionKind::Vote),
            "poll" => Ok(DecisionKind::Poll),
            _ => Err(format!("Unknown decision kind: {}. Valid: vote, poll", s)),
        }
    }
}

/// Lifecycle state of a decision
///
/// `Pending → Voted → Completed`. Poll decisions drop back to `Pending`
/// at the start of every new round. Nothing leaves `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Pending,
    Voted,
    Completed,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Pending => "pending",
            DecisionStatus::Voted => "voted",
            DecisionStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DecisionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DecisionStatus::Pending),
            "voted" => Ok(DecisionStatus::Voted),
            "completed" => Ok(DecisionStatus::Completed),
            _ => Err(format!("Unknown decision status: {}", s)),
        }
    }
}

/// Which of the two seats a participant occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Creator,
    Partner,
}

/// The two fixed participants of a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    pub creator: UserId,
    pub partner: UserId,
}

impl Participants {
    pub fn new(creator: impl Into<UserId>, partner: impl Into<UserId>) -> Self {
        Self {
            creator: creator.into(),
            partner: partner.into(),
        }
    }

    /// Seat occupied by `user`, if any
    pub fn role_of(&self, user: &UserId) -> Option<Role> {
        if *user == self.creator {
            Some(Role::Creator)
        } else if *user == self.partner {
            Some(Role::Partner)
        } else {
            None
        }
    }
}

/// Terminal outcome of a decision
///
/// Recorded as a unit so the winning option, the decider and the time
/// can never be observed partially set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub final_decision: OptionId,
    pub decided_by: UserId,
    pub decided_at: DateTime<Utc>,
}

impl Resolution {
    pub fn new(final_decision: OptionId, decided_by: UserId) -> Self {
        Self {
            final_decision,
            decided_by,
            decided_at: Utc::now(),
        }
    }
}

/// Request to open a new decision
#[derive(Debug, Clone)]
pub struct NewDecision {
    pub kind: DecisionKind,
    pub title: String,
    pub participants: Participants,
    pub options: Vec<String>,
}

impl NewDecision {
    pub fn new(
        kind: DecisionKind,
        title: impl Into<String>,
        participants: Participants,
        options: Vec<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            participants,
            options,
        }
    }

    /// Check the request before anything is written
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.participants.creator == self.participants.partner {
            return Err(DomainError::InvalidDecision(
                "creator and partner must be different users".to_string(),
            ));
        }
        if self.options.len() < 2 {
            return Err(DomainError::InvalidDecision(format!(
                "at least 2 options are required, got {}",
                self.options.len()
            )));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(DomainError::InvalidDecision(
                "option titles must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A joint choice between two participants (Entity, aggregate root)
///
/// Only serialized, never deserialized: rebuilding goes through
/// [`Decision::restore`] so the resolution invariant is checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    id: DecisionId,
    title: String,
    kind: DecisionKind,
    status: DecisionStatus,
    current_round: u32,
    participants: Participants,
    resolution: Option<Resolution>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Decision {
    /// Open a fresh decision at round 1
    pub fn open(id: DecisionId, request: &NewDecision) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: request.title.clone(),
            kind: request.kind,
            status: DecisionStatus::Pending,
            current_round: 1,
            participants: request.participants.clone(),
            resolution: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a decision from stored columns.
    ///
    /// Fails when the stored status and resolution disagree, which would
    /// mean the row was finalized partially.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: DecisionId,
        title: String,
        kind: DecisionKind,
        status: DecisionStatus,
        current_round: u32,
        participants: Participants,
        resolution: Option<Resolution>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if (status == DecisionStatus::Completed) != resolution.is_some() {
            return Err(DomainError::InvalidDecision(format!(
                "decision {} has status '{}' but resolution is {}",
                id,
                status,
                if resolution.is_some() { "set" } else { "missing" }
            )));
        }
        if current_round == 0 {
            return Err(DomainError::InvalidDecision(format!(
                "decision {} has round 0",
                id
            )));
        }
        Ok(Self {
            id,
            title,
            kind,
            status,
            current_round,
            participants,
            resolution,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> &DecisionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> DecisionKind {
        self.kind
    }

    pub fn status(&self) -> DecisionStatus {
        self.status
    }

    /// Round votes are currently collected for. Always 1 for vote mode.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn final_decision(&self) -> Option<&OptionId> {
        self.resolution.as_ref().map(|r| &r.final_decision)
    }

    pub fn decided_by(&self) -> Option<&UserId> {
        self.resolution.as_ref().map(|r| &r.decided_by)
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.resolution.as_ref().map(|r| r.decided_at)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == DecisionStatus::Completed
    }

    /// Whether the current round is the poll's last (creator sits out)
    pub fn is_final_round(&self) -> bool {
        self.kind == DecisionKind::Poll && self.current_round >= super::round::FINAL_ROUND
    }

    /// Fail unless votes for `round` are still being collected.
    ///
    /// Stores call this inside the write that depends on it, so a session
    /// acting on an earlier read cannot touch a finished round.
    pub fn ensure_open_at(&self, round: u32) -> Result<(), DomainError> {
        if self.is_completed() {
            return Err(DomainError::DecisionAlreadyCompleted(self.id.clone()));
        }
        if self.current_round != round {
            return Err(DomainError::RoundMoved {
                expected: round,
                current: self.current_round,
            });
        }
        Ok(())
    }

    /// Set a non-terminal status. Returns `false` (and changes nothing)
    /// once the decision is completed.
    pub fn set_status(&mut self, status: DecisionStatus) -> bool {
        if self.is_completed() || status == DecisionStatus::Completed {
            return false;
        }
        self.status = status;
        self.updated_at = Utc::now();
        true
    }

    /// Move to the next poll round and reset the status to pending.
    pub fn advance_round(&mut self) {
        self.current_round += 1;
        self.status = DecisionStatus::Pending;
        self.updated_at = Utc::now();
    }

    /// Record the terminal outcome. Returns `false` if already completed.
    pub fn complete(&mut self, resolution: Resolution) -> bool {
        if self.is_completed() {
            return false;
        }
        self.updated_at = resolution.decided_at;
        self.status = DecisionStatus::Completed;
        self.resolution = Some(resolution);
        true
    }
}

/// One choice within a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub id: OptionId,
    pub decision_id: DecisionId,
    pub title: String,
    /// Display-only counter. Engine logic always tallies the vote ledger.
    pub votes: u32,
    pub eliminated_in_round: Option<u32>,
}

impl DecisionOption {
    pub fn new(decision_id: DecisionId, title: impl Into<String>) -> Self {
        Self {
            id: OptionId::generate(),
            decision_id,
            title: title.into(),
            votes: 0,
            eliminated_in_round: None,
        }
    }
}
