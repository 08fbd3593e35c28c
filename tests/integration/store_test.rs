#![allow(clippy::expect_used)]

use chrono::{TimeDelta, Utc};

use wpswatch::domain::entities::measurement::{FailureKind, Measurement};
use wpswatch::domain::ports::store::{MeasurementQuery, MeasurementStore};
use wpswatch::infrastructure::persistence::in_memory_store::InMemoryStore;
use wpswatch::infrastructure::persistence::sqlite_store::SqliteStore;

fn sqlite_store() -> (SqliteStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wpswatch.db");
    let store = SqliteStore::new(path.to_str().expect("path")).expect("store");
    (store, dir)
}

fn seed(store: &dyn MeasurementStore) {
    for (minutes_ago, ms) in [(30_i64, 10_u64), (20, 20), (10, 30)] {
        let mut m = Measurement::success("buffer", ms);
        m.timestamp = Utc::now() - TimeDelta::minutes(minutes_ago);
        store.append(&m).expect("append");
    }
    store
        .append(&Measurement::failure("buffer", FailureKind::ServiceFault))
        .expect("append");
}

/// Both store implementations must answer every query shape identically.
fn assert_store_contract(store: &dyn MeasurementStore) {
    seed(store);

    let all = store.query("buffer", &MeasurementQuery::All).expect("all");
    assert_eq!(all.len(), 4);
    assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let recent = store
        .query("buffer", &MeasurementQuery::MostRecent(2))
        .expect("recent");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].failure, Some(FailureKind::ServiceFault));

    let since = Utc::now() - TimeDelta::minutes(25);
    let until = Utc::now() - TimeDelta::minutes(5);
    let range = store
        .query("buffer", &MeasurementQuery::Range { since, until })
        .expect("range");
    assert_eq!(range.len(), 2);
    assert_eq!(range[0].response_time_ms, Some(20));

    let deleted = store
        .delete_older_than(Utc::now() - TimeDelta::minutes(15))
        .expect("delete");
    assert_eq!(deleted, 2);
    let remaining = store.query("buffer", &MeasurementQuery::All).expect("all");
    assert_eq!(remaining.len(), 2);
}

#[test]
fn in_memory_store_honors_the_contract() {
    let store = InMemoryStore::new();
    assert_store_contract(&store);
}

#[test]
fn sqlite_store_honors_the_contract() {
    let (store, _dir) = sqlite_store();
    assert_store_contract(&store);
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wpswatch.db");
    let path_str = path.to_str().expect("path");

    {
        let store = SqliteStore::new(path_str).expect("store");
        store
            .append(&Measurement::success("buffer", 42))
            .expect("append");
    }

    let reopened = SqliteStore::new(path_str).expect("reopen");
    let rows = reopened
        .query("buffer", &MeasurementQuery::All)
        .expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].response_time_ms, Some(42));
}
