use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pretty_assertions::assert_eq;
use scout_core::{Bounty, CycleSettings, Outcome, RecordPolicy};
use scout_engine::{
    LineFileSeenStore, NotificationSink, NotifyError, Orchestrator, PersistError, SeenStore,
    SourceError, SourceFailure, SourceProvider,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scout_logging::initialize_for_tests);
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

struct FixedSource(Result<Vec<Value>, SourceError>);

#[async_trait::async_trait]
impl SourceProvider for FixedSource {
    async fn fetch_listings(&self) -> Result<Vec<Value>, SourceError> {
        self.0.clone()
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    delivered: Arc<Mutex<Vec<Bounty>>>,
    fail: bool,
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, bounty: &Bounty) -> Result<(), NotifyError> {
        self.delivered.lock().unwrap().push(bounty.clone());
        if self.fail {
            Err(NotifyError::Rejected {
                status: 500,
                body: "boom".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Store whose reads and writes always fail.
struct BrokenStore;

impl SeenStore for BrokenStore {
    fn read_all(&self) -> Result<HashSet<String>, PersistError> {
        Err(PersistError::StoreDir("unavailable".to_string()))
    }

    fn record(&self, _link: &str) -> Result<(), PersistError> {
        Err(PersistError::StoreDir("unavailable".to_string()))
    }
}

fn scenario_records() -> Vec<Value> {
    vec![
        json!({ "title": "X", "reward": "$50", "link": "/b/1", "posted_time": iso(now() - TimeDelta::hours(1)) }),
        json!({ "title": "Y", "reward": "$200", "link": "/b/2", "posted_time": iso(now() - TimeDelta::hours(30)) }),
    ]
}

fn orchestrator(
    source: FixedSource,
    sink: RecordingSink,
    store: impl SeenStore + 'static,
    settings: CycleSettings,
) -> Orchestrator {
    Orchestrator::new(Box::new(source), Box::new(sink), Box::new(store), settings)
        .with_clock(Arc::new(now))
}

#[tokio::test]
async fn scenario_a_notifies_and_records_winner() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = LineFileSeenStore::new(temp.path().join("sent_bounties.txt"));
    let sink = RecordingSink::default();

    let outcome = orchestrator(
        FixedSource(Ok(scenario_records())),
        sink.clone(),
        store.clone(),
        CycleSettings::default(),
    )
    .run_cycle()
    .await
    .unwrap();

    let expected = Bounty::new(
        "X",
        50,
        "https://replit.com/b/1",
        now() - TimeDelta::hours(1),
    );
    assert_eq!(
        outcome,
        Outcome::Notified {
            bounty: expected.clone(),
            delivered: true,
            recorded: true,
        }
    );
    assert_eq!(*sink.delivered.lock().unwrap(), vec![expected]);
    assert_eq!(
        std::fs::read_to_string(store.path()).unwrap(),
        "https://replit.com/b/1\n"
    );
}

#[tokio::test]
async fn second_cycle_finds_nothing_new() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = LineFileSeenStore::new(temp.path().join("sent_bounties.txt"));
    let sink = RecordingSink::default();
    let orchestrator = orchestrator(
        FixedSource(Ok(scenario_records())),
        sink.clone(),
        store.clone(),
        CycleSettings::default(),
    );

    orchestrator.run_cycle().await.unwrap();
    let second = orchestrator.run_cycle().await.unwrap();

    assert_eq!(second, Outcome::NoNewBounties);
    assert_eq!(sink.delivered.lock().unwrap().len(), 1);
    assert_eq!(store.read_all().unwrap().len(), 1);
}

#[tokio::test]
async fn scenario_b_already_seen_winner() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = LineFileSeenStore::new(temp.path().join("sent_bounties.txt"));
    store.record("https://replit.com/b/1").unwrap();
    let sink = RecordingSink::default();

    let outcome = orchestrator(
        FixedSource(Ok(scenario_records())),
        sink.clone(),
        store.clone(),
        CycleSettings::default(),
    )
    .run_cycle()
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::NoNewBounties);
    assert!(sink.delivered.lock().unwrap().is_empty());
    assert_eq!(
        std::fs::read_to_string(store.path()).unwrap(),
        "https://replit.com/b/1\n"
    );
}

#[tokio::test]
async fn scenario_c_failed_source_leaves_store_untouched() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = LineFileSeenStore::new(temp.path().join("sent_bounties.txt"));
    let sink = RecordingSink::default();
    let failure = SourceError {
        kind: SourceFailure::Unsuccessful,
        message: "success flag not set".to_string(),
    };

    let outcome = orchestrator(
        FixedSource(Err(failure)),
        sink.clone(),
        store.clone(),
        CycleSettings::default(),
    )
    .run_cycle()
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::NoBountiesFound);
    assert!(sink.delivered.lock().unwrap().is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn failed_delivery_is_recorded_under_default_policy() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = LineFileSeenStore::new(temp.path().join("sent_bounties.txt"));
    let sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };

    let outcome = orchestrator(
        FixedSource(Ok(scenario_records())),
        sink,
        store.clone(),
        CycleSettings::default(),
    )
    .run_cycle()
    .await
    .unwrap();

    assert!(matches!(
        outcome,
        Outcome::Notified {
            delivered: false,
            recorded: true,
            ..
        }
    ));
    assert!(store.read_all().unwrap().contains("https://replit.com/b/1"));
}

#[tokio::test]
async fn failed_delivery_is_retried_next_cycle_with_on_delivery_policy() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = LineFileSeenStore::new(temp.path().join("sent_bounties.txt"));
    let sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };
    let settings = CycleSettings {
        record_policy: RecordPolicy::OnDelivery,
        ..CycleSettings::default()
    };
    let orchestrator = orchestrator(
        FixedSource(Ok(scenario_records())),
        sink.clone(),
        store.clone(),
        settings,
    );

    let first = orchestrator.run_cycle().await.unwrap();
    let second = orchestrator.run_cycle().await.unwrap();

    assert_eq!(first, second);
    assert!(matches!(
        first,
        Outcome::Notified {
            delivered: false,
            recorded: false,
            ..
        }
    ));
    assert_eq!(sink.delivered.lock().unwrap().len(), 2);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn unreadable_store_is_treated_as_empty_but_write_failure_is_fatal() {
    init_logging();
    let sink = RecordingSink::default();

    let result = orchestrator(
        FixedSource(Ok(scenario_records())),
        sink.clone(),
        BrokenStore,
        CycleSettings::default(),
    )
    .run_cycle()
    .await;

    assert!(matches!(
        result,
        Err(scout_engine::CycleError::Persist(PersistError::StoreDir(_)))
    ));
    // The read failure did not stop selection or delivery.
    assert_eq!(sink.delivered.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn highest_recent_value_wins_among_many() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = LineFileSeenStore::new(temp.path().join("sent_bounties.txt"));
    let records = vec![
        json!({ "title": "a", "reward": "$100", "link": "/b/a", "posted_time": iso(now() - TimeDelta::hours(2)) }),
        json!({ "title": "b", "reward": "$400", "link": "/b/b", "posted_time": iso(now() - TimeDelta::hours(3)) }),
        json!({ "title": "c", "reward": "TBD", "link": "/b/c" }),
        json!({ "title": "d", "reward": "$400", "link": "/b/d" }),
        json!({ "title": "e", "reward": "$900", "link": "/b/e", "posted_time": iso(now() - TimeDelta::days(2)) }),
    ];

    let outcome = orchestrator(
        FixedSource(Ok(records)),
        RecordingSink::default(),
        store,
        CycleSettings::default(),
    )
    .run_cycle()
    .await
    .unwrap();

    assert_eq!(outcome.bounty().map(|b| b.title.as_str()), Some("b"));
}
