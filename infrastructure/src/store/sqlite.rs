//! SQLite decision store
//!
//! One connection behind a mutex; every call runs on the blocking pool.
//! The atomic primitives map onto SQL directly:
//!
//! - vote upsert: decision row checked for the round, then
//!   `UNIQUE(decision_id, user_id, round)` + `ON CONFLICT DO UPDATE`
//! - round advance: `UPDATE .. WHERE current_round = ?expected` in a transaction
//! - status and completion: `UPDATE .. WHERE current_round = ?expected
//!   AND status != 'completed'`
//!
//! Write transactions start `IMMEDIATE`, taking the write lock up front.
//! A deferred transaction that reads first cannot be upgraded once another
//! connection has committed, and `busy_timeout` does not retry that case.
//! The guards therefore also hold across processes sharing the same
//! database file.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tandem_application::ports::decision_store::{
    Completion, DecisionStore, RoundAdvance, StoreError,
};
use tandem_domain::{
    Decision, DecisionId, DecisionKind, DecisionOption, DecisionStatus, NewDecision, OptionId,
    Participants, Resolution, UserId, Vote,
};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS decisions (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    kind            TEXT NOT NULL,
    status          TEXT NOT NULL,
    current_round   INTEGER NOT NULL,
    creator_id      TEXT NOT NULL,
    partner_id      TEXT NOT NULL,
    final_decision  TEXT,
    decided_by      TEXT,
    decided_at      TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS decision_options (
    id                  TEXT PRIMARY KEY,
    decision_id         TEXT NOT NULL REFERENCES decisions(id) ON DELETE CASCADE,
    position            INTEGER NOT NULL,
    title               TEXT NOT NULL,
    votes               INTEGER NOT NULL DEFAULT 0,
    eliminated_in_round INTEGER
);
CREATE INDEX IF NOT EXISTS idx_options_decision ON decision_options(decision_id, position);
CREATE TABLE IF NOT EXISTS decision_votes (
    decision_id TEXT NOT NULL REFERENCES decisions(id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL,
    option_id   TEXT NOT NULL,
    round       INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (decision_id, user_id, round)
);
";

const DECISION_COLUMNS: &str = "id, title, kind, status, current_round, creator_id, partner_id, \
     final_decision, decided_by, decided_at, created_at, updated_at";

const OPTION_COLUMNS: &str = "id, decision_id, title, votes, eliminated_in_round";

const VOTE_COLUMNS: &str = "decision_id, user_id, option_id, round, created_at, updated_at";

fn query_err(e: rusqlite::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn begin_write(conn: &mut Connection) -> Result<Transaction<'_>, StoreError> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(query_err)
}

/// Fixed-width RFC 3339 so text ordering equals time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            table,
            reason: format!("bad timestamp '{}': {}", raw, e),
        })
}

/// Raw `decisions` row, converted outside the rusqlite row callback.
struct DecisionRow {
    id: String,
    title: String,
    kind: String,
    status: String,
    current_round: u32,
    creator_id: String,
    partner_id: String,
    final_decision: Option<String>,
    decided_by: Option<String>,
    decided_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl DecisionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            kind: row.get(2)?,
            status: row.get(3)?,
            current_round: row.get(4)?,
            creator_id: row.get(5)?,
            partner_id: row.get(6)?,
            final_decision: row.get(7)?,
            decided_by: row.get(8)?,
            decided_at: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn into_decision(self) -> Result<Decision, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            table: "decisions",
            reason,
        };

        let kind = self.kind.parse::<DecisionKind>().map_err(corrupt)?;
        let status = self.status.parse::<DecisionStatus>().map_err(corrupt)?;
        let resolution = match (self.final_decision, self.decided_by, self.decided_at) {
            (Some(final_decision), Some(decided_by), Some(decided_at)) => Some(Resolution {
                final_decision: OptionId::new(final_decision),
                decided_by: UserId::new(decided_by),
                decided_at: parse_timestamp("decisions", &decided_at)?,
            }),
            (None, None, None) => None,
            _ => {
                return Err(corrupt(format!(
                    "decision {} has a partial resolution",
                    self.id
                )));
            }
        };

        Decision::restore(
            DecisionId::new(self.id),
            self.title,
            kind,
            status,
            self.current_round,
            Participants::new(self.creator_id, self.partner_id),
            resolution,
            parse_timestamp("decisions", &self.created_at)?,
            parse_timestamp("decisions", &self.updated_at)?,
        )
        .map_err(|e| corrupt(e.to_string()))
    }
}

fn option_from_row(row: &Row<'_>) -> rusqlite::Result<DecisionOption> {
    Ok(DecisionOption {
        id: OptionId::new(row.get::<_, String>(0)?),
        decision_id: DecisionId::new(row.get::<_, String>(1)?),
        title: row.get(2)?,
        votes: row.get(3)?,
        eliminated_in_round: row.get(4)?,
    })
}

struct VoteRow {
    decision_id: String,
    user_id: String,
    option_id: String,
    round: u32,
    created_at: String,
    updated_at: String,
}

impl VoteRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            decision_id: row.get(0)?,
            user_id: row.get(1)?,
            option_id: row.get(2)?,
            round: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_vote(self) -> Result<Vote, StoreError> {
        Ok(Vote {
            decision_id: DecisionId::new(self.decision_id),
            user_id: UserId::new(self.user_id),
            option_id: OptionId::new(self.option_id),
            round: self.round,
            created_at: parse_timestamp("decision_votes", &self.created_at)?,
            updated_at: parse_timestamp("decision_votes", &self.updated_at)?,
        })
    }
}

fn load_decision(conn: &Connection, id: &str) -> Result<Option<Decision>, StoreError> {
    conn.query_row(
        &format!("SELECT {} FROM decisions WHERE id = ?1", DECISION_COLUMNS),
        [id],
        DecisionRow::from_row,
    )
    .optional()
    .map_err(query_err)?
    .map(DecisionRow::into_decision)
    .transpose()
}

fn require_decision(conn: &Connection, id: &DecisionId) -> Result<Decision, StoreError> {
    load_decision(conn, id.as_str())?.ok_or_else(|| StoreError::missing_decision(id))
}

fn load_options(conn: &Connection, decision_id: &str) -> Result<Vec<DecisionOption>, StoreError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM decision_options WHERE decision_id = ?1 ORDER BY position",
            OPTION_COLUMNS
        ))
        .map_err(query_err)?;
    let rows = stmt
        .query_map([decision_id], option_from_row)
        .map_err(query_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(query_err)
}

fn insert_options(
    tx: &Transaction<'_>,
    decision_id: &DecisionId,
    titles: &[String],
) -> Result<Vec<DecisionOption>, StoreError> {
    let mut options = Vec::with_capacity(titles.len());
    for (position, title) in titles.iter().enumerate() {
        let option = DecisionOption::new(decision_id.clone(), title.clone());
        tx.execute(
            "INSERT INTO decision_options (id, decision_id, position, title, votes)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![
                option.id.as_str(),
                decision_id.as_str(),
                position as i64,
                option.title
            ],
        )
        .map_err(query_err)?;
        options.push(option);
    }
    Ok(options)
}

fn load_vote(
    conn: &Connection,
    decision_id: &str,
    user_id: &str,
    round: u32,
) -> Result<Option<Vote>, StoreError> {
    conn.query_row(
        &format!(
            "SELECT {} FROM decision_votes WHERE decision_id = ?1 AND user_id = ?2 AND round = ?3",
            VOTE_COLUMNS
        ),
        params![decision_id, user_id, round],
        VoteRow::from_row,
    )
    .optional()
    .map_err(query_err)?
    .map(VoteRow::into_vote)
    .transpose()
}

/// SQLite-backed [`DecisionStore`]
#[derive(Clone)]
pub struct SqliteDecisionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDecisionStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Connection(format!("{}: {}", path.display(), e)))?;
        debug!("Opened SQLite store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Private database, gone when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.execute_batch(SCHEMA).map_err(query_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Other(format!("store task failed: {}", e)))?
    }
}

#[async_trait]
impl DecisionStore for SqliteDecisionStore {
    async fn insert_decision(
        &self,
        request: &NewDecision,
    ) -> Result<(Decision, Vec<DecisionOption>), StoreError> {
        let decision = Decision::open(DecisionId::generate(), request);
        let titles = request.options.clone();
        self.run(move |conn| {
            let tx = begin_write(conn)?;
            let participants = decision.participants();
            tx.execute(
                &format!(
                    "INSERT INTO decisions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL, NULL, ?8, ?9)",
                    DECISION_COLUMNS
                ),
                params![
                    decision.id().as_str(),
                    decision.title(),
                    decision.kind().as_str(),
                    decision.status().as_str(),
                    decision.current_round(),
                    participants.creator.as_str(),
                    participants.partner.as_str(),
                    timestamp(decision.created_at()),
                    timestamp(decision.updated_at()),
                ],
            )
            .map_err(query_err)?;
            let options = insert_options(&tx, decision.id(), &titles)?;
            tx.commit().map_err(query_err)?;
            Ok((decision, options))
        })
        .await
    }

    async fn find_decision(&self, id: &DecisionId) -> Result<Option<Decision>, StoreError> {
        let id = id.clone();
        self.run(move |conn| load_decision(conn, id.as_str())).await
    }

    async fn update_status(
        &self,
        id: &DecisionId,
        round: u32,
        status: DecisionStatus,
    ) -> Result<Decision, StoreError> {
        let id = id.clone();
        self.run(move |conn| {
            let tx = begin_write(conn)?;
            if status != DecisionStatus::Completed {
                tx.execute(
                    "UPDATE decisions SET status = ?1, updated_at = ?2
                     WHERE id = ?3 AND current_round = ?4 AND status != 'completed'",
                    params![status.as_str(), timestamp(Utc::now()), id.as_str(), round],
                )
                .map_err(query_err)?;
            }
            let decision = require_decision(&tx, &id)?;
            tx.commit().map_err(query_err)?;
            Ok(decision)
        })
        .await
    }

    async fn complete_decision(
        &self,
        id: &DecisionId,
        round: u32,
        resolution: Resolution,
    ) -> Result<Completion, StoreError> {
        let id = id.clone();
        self.run(move |conn| {
            let tx = begin_write(conn)?;
            let changed = tx
                .execute(
                    "UPDATE decisions
                     SET status = 'completed', final_decision = ?1, decided_by = ?2,
                         decided_at = ?3, updated_at = ?3
                     WHERE id = ?4 AND current_round = ?5 AND status != 'completed'",
                    params![
                        resolution.final_decision.as_str(),
                        resolution.decided_by.as_str(),
                        timestamp(resolution.decided_at),
                        id.as_str(),
                        round,
                    ],
                )
                .map_err(query_err)?;
            let decision = require_decision(&tx, &id)?;
            tx.commit().map_err(query_err)?;

            Ok(if changed == 1 {
                Completion::Completed(decision)
            } else if decision.is_completed() {
                Completion::AlreadyCompleted(decision)
            } else {
                Completion::Superseded(decision)
            })
        })
        .await
    }

    async fn delete_decision(&self, id: &DecisionId) -> Result<(), StoreError> {
        let id = id.clone();
        self.run(move |conn| {
            let tx = begin_write(conn)?;
            tx.execute(
                "DELETE FROM decision_votes WHERE decision_id = ?1",
                [id.as_str()],
            )
            .map_err(query_err)?;
            tx.execute(
                "DELETE FROM decision_options WHERE decision_id = ?1",
                [id.as_str()],
            )
            .map_err(query_err)?;
            let removed = tx
                .execute("DELETE FROM decisions WHERE id = ?1", [id.as_str()])
                .map_err(query_err)?;
            if removed == 0 {
                return Err(StoreError::missing_decision(&id));
            }
            tx.commit().map_err(query_err)
        })
        .await
    }

    async fn list_options(
        &self,
        decision_id: &DecisionId,
    ) -> Result<Vec<DecisionOption>, StoreError> {
        let decision_id = decision_id.clone();
        self.run(move |conn| load_options(conn, decision_id.as_str()))
            .await
    }

    async fn find_options(
        &self,
        decision_id: &DecisionId,
        ids: &[OptionId],
    ) -> Result<Vec<DecisionOption>, StoreError> {
        let decision_id = decision_id.clone();
        let ids = ids.to_vec();
        self.run(move |conn| {
            Ok(load_options(conn, decision_id.as_str())?
                .into_iter()
                .filter(|o| ids.contains(&o.id))
                .collect())
        })
        .await
    }

    async fn replace_options_and_advance(
        &self,
        decision_id: &DecisionId,
        from_round: u32,
        titles: &[String],
    ) -> Result<RoundAdvance, StoreError> {
        let decision_id = decision_id.clone();
        let titles = titles.to_vec();
        self.run(move |conn| {
            let tx = begin_write(conn)?;
            let advanced = tx
                .execute(
                    "UPDATE decisions
                     SET current_round = current_round + 1, status = 'pending', updated_at = ?1
                     WHERE id = ?2 AND current_round = ?3 AND status != 'completed'",
                    params![timestamp(Utc::now()), decision_id.as_str(), from_round],
                )
                .map_err(query_err)?;

            if advanced == 0 {
                let decision = require_decision(&tx, &decision_id)?;
                return Ok(RoundAdvance::AlreadyAdvanced(decision));
            }

            tx.execute(
                "DELETE FROM decision_options WHERE decision_id = ?1",
                [decision_id.as_str()],
            )
            .map_err(query_err)?;
            let options = insert_options(&tx, &decision_id, &titles)?;
            let decision = require_decision(&tx, &decision_id)?;
            tx.commit().map_err(query_err)?;

            Ok(RoundAdvance::Advanced { decision, options })
        })
        .await
    }

    async fn upsert_vote(
        &self,
        decision_id: &DecisionId,
        user_id: &UserId,
        option_id: &OptionId,
        round: u32,
    ) -> Result<Vote, StoreError> {
        let decision_id = decision_id.clone();
        let user_id = user_id.clone();
        let option_id = option_id.clone();
        self.run(move |conn| {
            let tx = begin_write(conn)?;
            require_decision(&tx, &decision_id)?
                .ensure_open_at(round)
                .map_err(StoreError::Rejected)?;

            let previous = load_vote(&tx, decision_id.as_str(), user_id.as_str(), round)?
                .map(|v| v.option_id);

            let now = timestamp(Utc::now());
            tx.execute(
                &format!(
                    "INSERT INTO decision_votes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                     ON CONFLICT(decision_id, user_id, round) DO UPDATE SET
                        option_id = excluded.option_id,
                        updated_at = excluded.updated_at",
                    VOTE_COLUMNS
                ),
                params![
                    decision_id.as_str(),
                    user_id.as_str(),
                    option_id.as_str(),
                    round,
                    now
                ],
            )
            .map_err(query_err)?;

            // Display counters only
            if previous.as_ref() != Some(&option_id) {
                if let Some(previous) = &previous {
                    tx.execute(
                        "UPDATE decision_options SET votes = MAX(votes - 1, 0)
                         WHERE id = ?1 AND decision_id = ?2",
                        params![previous.as_str(), decision_id.as_str()],
                    )
                    .map_err(query_err)?;
                }
                tx.execute(
                    "UPDATE decision_options SET votes = votes + 1
                     WHERE id = ?1 AND decision_id = ?2",
                    params![option_id.as_str(), decision_id.as_str()],
                )
                .map_err(query_err)?;
            }

            let vote = load_vote(&tx, decision_id.as_str(), user_id.as_str(), round)?
                .ok_or_else(|| StoreError::MissingRow {
                    table: "vote",
                    id: format!("{}/{}/{}", decision_id, user_id, round),
                })?;
            tx.commit().map_err(query_err)?;
            Ok(vote)
        })
        .await
    }

    async fn list_votes(
        &self,
        decision_id: &DecisionId,
        round: Option<u32>,
    ) -> Result<Vec<Vote>, StoreError> {
        let decision_id = decision_id.clone();
        self.run(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM decision_votes
                     WHERE decision_id = ?1 AND (?2 IS NULL OR round = ?2)
                     ORDER BY updated_at DESC, created_at DESC",
                    VOTE_COLUMNS
                ))
                .map_err(query_err)?;
            let rows = stmt
                .query_map(params![decision_id.as_str(), round], VoteRow::from_row)
                .map_err(query_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_err)?;
            rows.into_iter().map(VoteRow::into_vote).collect()
        })
        .await
    }

    async fn find_vote(
        &self,
        decision_id: &DecisionId,
        user_id: &UserId,
        round: u32,
    ) -> Result<Option<Vote>, StoreError> {
        let decision_id = decision_id.clone();
        let user_id = user_id.clone();
        self.run(move |conn| load_vote(conn, decision_id.as_str(), user_id.as_str(), round))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_domain::DomainError;

    async fn poll(store: &SqliteDecisionStore) -> (Decision, Vec<DecisionOption>) {
        store
            .insert_decision(&NewDecision::new(
                DecisionKind::Poll,
                "Movie night",
                Participants::new("alice", "bob"),
                vec!["Action".into(), "Drama".into(), "Comedy".into()],
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_decision_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tandem.db");

        let (decision, options) = {
            let store = SqliteDecisionStore::open(&path).unwrap();
            poll(&store).await
        };

        let reopened = SqliteDecisionStore::open(&path).unwrap();
        let loaded = reopened.find_decision(decision.id()).await.unwrap().unwrap();
        assert_eq!(loaded.title(), "Movie night");
        assert_eq!(loaded.kind(), DecisionKind::Poll);
        assert_eq!(loaded.current_round(), 1);
        assert_eq!(loaded.participants().partner, UserId::new("bob"));

        let titles: Vec<_> = reopened
            .list_options(decision.id())
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.title)
            .collect();
        assert_eq!(titles, vec!["Action", "Drama", "Comedy"]);
        assert_eq!(options.len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_vote_on_conflict_updates() {
        let store = SqliteDecisionStore::open_in_memory().unwrap();
        let (decision, options) = poll(&store).await;
        let alice = UserId::new("alice");

        let first = store
            .upsert_vote(decision.id(), &alice, &options[0].id, 1)
            .await
            .unwrap();
        let second = store
            .upsert_vote(decision.id(), &alice, &options[2].id, 1)
            .await
            .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        let votes = store.list_votes(decision.id(), Some(1)).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].option_id, options[2].id);

        let counters: Vec<_> = store
            .list_options(decision.id())
            .await
            .unwrap()
            .iter()
            .map(|o| o.votes)
            .collect();
        assert_eq!(counters, vec![0, 0, 1]);
    }

    #[tokio::test]
    async fn test_advance_and_complete_are_guarded() {
        let store = SqliteDecisionStore::open_in_memory().unwrap();
        let (decision, _) = poll(&store).await;
        let titles = vec!["Action".to_string(), "Drama".to_string()];

        let advanced = store
            .replace_options_and_advance(decision.id(), 1, &titles)
            .await
            .unwrap();
        assert!(advanced.was_applied());
        assert_eq!(advanced.decision().current_round(), 2);
        assert_eq!(advanced.decision().status(), DecisionStatus::Pending);

        let again = store
            .replace_options_and_advance(decision.id(), 1, &titles)
            .await
            .unwrap();
        assert!(!again.was_applied());

        let options = store.list_options(decision.id()).await.unwrap();
        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|o| o.votes == 0));

        let stale = store
            .complete_decision(
                decision.id(),
                1,
                Resolution::new(options[0].id.clone(), UserId::new("bob")),
            )
            .await
            .unwrap();
        assert!(matches!(stale, Completion::Superseded(_)));

        let done = store
            .complete_decision(
                decision.id(),
                2,
                Resolution::new(options[0].id.clone(), UserId::new("bob")),
            )
            .await
            .unwrap();
        assert!(done.was_applied());

        let repeat = store
            .complete_decision(
                decision.id(),
                2,
                Resolution::new(options[1].id.clone(), UserId::new("alice")),
            )
            .await
            .unwrap();
        assert!(matches!(repeat, Completion::AlreadyCompleted(_)));
        let kept = repeat.into_decision();
        assert_eq!(kept.final_decision(), Some(&options[0].id));
        assert_eq!(kept.decided_by(), Some(&UserId::new("bob")));

        let status = store
            .update_status(decision.id(), 2, DecisionStatus::Voted)
            .await
            .unwrap();
        assert_eq!(status.status(), DecisionStatus::Completed);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_reports_missing() {
        let store = SqliteDecisionStore::open_in_memory().unwrap();
        let (decision, options) = poll(&store).await;
        store
            .upsert_vote(decision.id(), &UserId::new("bob"), &options[1].id, 1)
            .await
            .unwrap();

        store.delete_decision(decision.id()).await.unwrap();
        assert!(store.find_decision(decision.id()).await.unwrap().is_none());
        assert!(store.list_options(decision.id()).await.unwrap().is_empty());
        assert!(store.list_votes(decision.id(), None).await.unwrap().is_empty());

        let err = store.delete_decision(decision.id()).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingRow { .. }));
    }

    #[tokio::test]
    async fn test_missing_decision_status_update_fails() {
        let store = SqliteDecisionStore::open_in_memory().unwrap();
        let err = store
            .update_status(&DecisionId::new("nope"), 1, DecisionStatus::Voted)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingRow { table: "decision", .. }));
    }

    #[tokio::test]
    async fn test_left_round_keeps_its_votes_and_status() {
        let store = SqliteDecisionStore::open_in_memory().unwrap();
        let (decision, options) = poll(&store).await;
        let alice = UserId::new("alice");
        store
            .upsert_vote(decision.id(), &alice, &options[0].id, 1)
            .await
            .unwrap();
        store
            .replace_options_and_advance(
                decision.id(),
                1,
                &["Action".to_string(), "Drama".to_string()],
            )
            .await
            .unwrap();

        let err = store
            .upsert_vote(decision.id(), &alice, &options[1].id, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected(DomainError::RoundMoved {
                expected: 1,
                current: 2
            })
        ));
        let kept = store
            .find_vote(decision.id(), &alice, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.option_id, options[0].id);

        let status = store
            .update_status(decision.id(), 1, DecisionStatus::Voted)
            .await
            .unwrap();
        assert_eq!(status.status(), DecisionStatus::Pending);
        assert_eq!(status.current_round(), 2);
    }

    #[tokio::test]
    async fn test_upsert_on_missing_decision_fails() {
        let store = SqliteDecisionStore::open_in_memory().unwrap();
        let err = store
            .upsert_vote(
                &DecisionId::new("nope"),
                &UserId::new("alice"),
                &OptionId::new("x"),
                1,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingRow { table: "decision", .. }));
    }
}
