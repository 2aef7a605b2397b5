//! State shared by the voting use cases within one process.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tandem_domain::{DecisionId, UserId};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per decision id.
///
/// Held across "cast → detect completion → act" so two sessions in the
/// same process cannot both progress or finalize a decision. Cross-process
/// races are covered by the store's guarded primitives.
///
/// Entries nobody holds or waits on are dropped on the next `acquire`, so
/// completed, deleted and abandoned decisions do not pile up.
#[derive(Default)]
pub(crate) struct DecisionLocks {
    locks: AsyncMutex<HashMap<DecisionId, Arc<AsyncMutex<()>>>>,
}

impl DecisionLocks {
    pub(crate) async fn acquire(&self, id: &DecisionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // The map's own reference is the only one left on idle entries
            locks.retain(|key, lock| key == id || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Who has voted in the current round, per decision.
///
/// Advisory only: filled as votes are cast and cleared when a round ends.
/// The vote ledger stays authoritative.
#[derive(Default)]
pub(crate) struct RoundVoterCache {
    voters: Mutex<HashMap<DecisionId, HashSet<UserId>>>,
}

impl RoundVoterCache {
    pub(crate) fn record(&self, id: &DecisionId, user: &UserId) {
        if let Ok(mut voters) = self.voters.lock() {
            voters.entry(id.clone()).or_default().insert(user.clone());
        }
    }

    pub(crate) fn has_voted(&self, id: &DecisionId, user: &UserId) -> bool {
        self.voters
            .lock()
            .map(|voters| voters.get(id).is_some_and(|set| set.contains(user)))
            .unwrap_or(false)
    }

    pub(crate) fn clear(&self, id: &DecisionId) {
        if let Ok(mut voters) = self.voters.lock() {
            voters.remove(id);
        }
    }
}
