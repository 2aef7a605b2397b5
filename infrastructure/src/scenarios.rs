//! Whole-engine runs against the real stores and notifiers.

use crate::notify::BroadcastNotifier;
use crate::store::{InMemoryDecisionStore, SqliteDecisionStore};
use std::sync::Arc;
use tandem_application::{
    CastVoteInput, CastVoteOutput, CastVoteUseCase, ChangeKind, ChangeTopic,
    CreateDecisionInput, CreateDecisionUseCase, DecisionError, DecisionStore, RoundTally,
    VoteOutcome,
};
use tandem_domain::{
    Decision, DecisionKind, DecisionOption, DecisionStatus, DomainError, OptionId, UserId,
};

fn id_of(options: &[DecisionOption], title: &str) -> OptionId {
    options
        .iter()
        .find(|o| o.title == title)
        .map(|o| o.id.clone())
        .unwrap()
}

async fn open<S: DecisionStore + 'static>(
    store: &Arc<S>,
    kind: DecisionKind,
    options: &[&str],
) -> (Decision, Vec<DecisionOption>) {
    let output = CreateDecisionUseCase::new(Arc::clone(store))
        .execute(
            CreateDecisionInput::new(kind, "Movie night", "creator", "partner")
                .with_options(options.iter().copied()),
        )
        .await
        .unwrap();
    (output.decision, output.options)
}

async fn vote<S: DecisionStore + 'static>(
    engine: &CastVoteUseCase<S>,
    decision: &Decision,
    user: &str,
    options: &[DecisionOption],
    title: &str,
) -> Result<CastVoteOutput, DecisionError> {
    engine
        .execute(CastVoteInput::new(
            decision.id().clone(),
            user,
            id_of(options, title),
        ))
        .await
}

async fn scenario_a<S: DecisionStore + 'static>(store: Arc<S>) {
    let engine = CastVoteUseCase::new(Arc::clone(&store));
    let (decision, options) = open(&store, DecisionKind::Vote, &["Pizza", "Sushi"]).await;

    let first = vote(&engine, &decision, "creator", &options, "Sushi")
        .await
        .unwrap();
    assert_eq!(first.outcome, VoteOutcome::AwaitingPartner);

    vote(&engine, &decision, "partner", &options, "Sushi")
        .await
        .unwrap();

    let stored = store.find_decision(decision.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), DecisionStatus::Completed);
    assert_eq!(stored.final_decision(), Some(&id_of(&options, "Sushi")));
}

async fn scenario_b<S: DecisionStore + 'static>(store: Arc<S>) {
    let notifier = Arc::new(BroadcastNotifier::default());
    let engine = CastVoteUseCase::new(Arc::clone(&store)).with_notifier(notifier.clone());
    let (decision, options) =
        open(&store, DecisionKind::Poll, &["Action", "Drama", "Comedy"]).await;
    let mut watch = notifier.subscribe_topic(ChangeTopic::Decision(decision.id().clone()));

    vote(&engine, &decision, "creator", &options, "Action")
        .await
        .unwrap();
    let r1 = vote(&engine, &decision, "partner", &options, "Drama")
        .await
        .unwrap();
    assert_eq!(r1.outcome, VoteOutcome::AdvancedToRound { round: 2 });

    vote(&engine, &decision, "creator", &r1.options, "Action")
        .await
        .unwrap();
    let r2 = vote(&engine, &decision, "partner", &r1.options, "Drama")
        .await
        .unwrap();
    assert_eq!(r2.outcome, VoteOutcome::AdvancedToRound { round: 3 });

    let blocked = vote(&engine, &decision, "creator", &r2.options, "Drama")
        .await
        .unwrap_err();
    assert!(matches!(
        blocked,
        DecisionError::Validation(DomainError::CreatorBlockedInFinalRound)
    ));

    vote(&engine, &decision, "partner", &r2.options, "Action")
        .await
        .unwrap();

    let stored = store.find_decision(decision.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), DecisionStatus::Completed);
    assert_eq!(stored.current_round(), 3);
    assert_eq!(stored.decided_by(), Some(&UserId::new("partner")));
    let final_option = store
        .list_options(decision.id())
        .await
        .unwrap()
        .into_iter()
        .find(|o| Some(&o.id) == stored.final_decision())
        .unwrap();
    assert_eq!(final_option.title, "Action");

    // The round 3 tally only holds the partner's vote
    let tally = RoundTally::new(Arc::clone(&store))
        .tally(decision.id(), 3)
        .await
        .unwrap();
    assert_eq!(tally.total_votes(), 1);

    let mut kinds = Vec::new();
    while let Ok(Some(event)) =
        tokio::time::timeout(std::time::Duration::from_millis(50), watch.recv()).await
    {
        kinds.push(event.kind);
    }
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == ChangeKind::RoundAdvanced)
            .count(),
        2
    );
    assert_eq!(kinds.last(), Some(&ChangeKind::DecisionCompleted));
}

async fn scenario_c<S: DecisionStore + 'static>(store: Arc<S>) {
    let engine = CastVoteUseCase::new(Arc::clone(&store));
    let (decision, options) =
        open(&store, DecisionKind::Poll, &["Action", "Drama", "Comedy"]).await;

    vote(&engine, &decision, "creator", &options, "Comedy")
        .await
        .unwrap();
    let done = vote(&engine, &decision, "partner", &options, "Comedy")
        .await
        .unwrap();

    assert_eq!(
        done.outcome,
        VoteOutcome::Completed {
            final_decision: id_of(&options, "Comedy"),
            decided_by: UserId::new("partner"),
        }
    );
    assert_eq!(done.decision.current_round(), 1);
    // Still the original three options
    assert_eq!(store.list_options(decision.id()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_scenarios_in_memory() {
    scenario_a(Arc::new(InMemoryDecisionStore::new())).await;
    scenario_b(Arc::new(InMemoryDecisionStore::new())).await;
    scenario_c(Arc::new(InMemoryDecisionStore::new())).await;
}

#[tokio::test]
async fn test_scenarios_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteDecisionStore::open(dir.path().join("tandem.db")).unwrap());
    scenario_a(Arc::clone(&store)).await;
    scenario_b(Arc::clone(&store)).await;
    scenario_c(store).await;
}

#[tokio::test]
async fn test_two_engines_on_one_database_progress_once() {
    // Two processes sharing a file, modeled as two engines with separate locks
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let store_a = Arc::new(SqliteDecisionStore::open(&path).unwrap());
    let store_b = Arc::new(SqliteDecisionStore::open(&path).unwrap());
    let engine_b = CastVoteUseCase::new(Arc::clone(&store_b));

    let (decision, options) = open(&store_a, DecisionKind::Poll, &["A", "B", "C"]).await;
    store_a
        .upsert_vote(decision.id(), &UserId::new("creator"), &id_of(&options, "A"), 1)
        .await
        .unwrap();

    let outcome = vote(&engine_b, &decision, "partner", &options, "B")
        .await
        .unwrap();
    assert_eq!(outcome.outcome, VoteOutcome::AdvancedToRound { round: 2 });

    // A stale duplicate trigger from the other side changes nothing
    let titles = vec!["A".to_string(), "B".to_string()];
    let again = store_a
        .replace_options_and_advance(decision.id(), 1, &titles)
        .await
        .unwrap();
    assert!(!again.was_applied());
    assert_eq!(store_a.list_options(decision.id()).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_engines_on_one_database_vote_at_the_same_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let store_a = Arc::new(SqliteDecisionStore::open(&path).unwrap());
    let store_b = Arc::new(SqliteDecisionStore::open(&path).unwrap());
    let engine_a = Arc::new(CastVoteUseCase::new(Arc::clone(&store_a)));
    let engine_b = Arc::new(CastVoteUseCase::new(Arc::clone(&store_b)));

    for _ in 0..20 {
        let (decision, options) = open(&store_a, DecisionKind::Poll, &["A", "B", "C"]).await;

        let creator = {
            let engine = Arc::clone(&engine_a);
            let input = CastVoteInput::new(decision.id().clone(), "creator", id_of(&options, "A"));
            tokio::spawn(async move { engine.execute(input).await })
        };
        let partner = {
            let engine = Arc::clone(&engine_b);
            let input = CastVoteInput::new(decision.id().clone(), "partner", id_of(&options, "B"));
            tokio::spawn(async move { engine.execute(input).await })
        };
        let (creator, partner) = futures::future::join(creator, partner).await;

        // Neither side sees a busy or snapshot error
        let creator = creator.unwrap().unwrap();
        let partner = partner.unwrap().unwrap();
        let advanced = VoteOutcome::AdvancedToRound { round: 2 };
        assert!(creator.outcome == advanced || partner.outcome == advanced);

        let stored = store_b.find_decision(decision.id()).await.unwrap().unwrap();
        assert_eq!(stored.current_round(), 2);
        assert_eq!(stored.status(), DecisionStatus::Pending);
        assert_eq!(store_b.list_options(decision.id()).await.unwrap().len(), 2);
        assert_eq!(
            store_b
                .list_votes(decision.id(), Some(1))
                .await
                .unwrap()
                .len(),
            2
        );
    }
}
