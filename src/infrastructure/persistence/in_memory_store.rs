use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::entities::measurement::Measurement;
use crate::domain::ports::store::{MeasurementQuery, MeasurementStore, StoreError};

/// In-memory store for testing purposes.
pub struct InMemoryStore {
    measurements: Mutex<Vec<Measurement>>,
}

impl InMemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            measurements: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementStore for InMemoryStore {
    fn append(&self, measurement: &Measurement) -> Result<(), StoreError> {
        self.measurements
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .push(measurement.clone());
        Ok(())
    }

    fn query(
        &self,
        process: &str,
        query: &MeasurementQuery,
    ) -> Result<Vec<Measurement>, StoreError> {
        let mut rows: Vec<Measurement> = self
            .measurements
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .iter()
            .filter(|m| m.process == process)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.timestamp);

        match *query {
            MeasurementQuery::All => {}
            MeasurementQuery::MostRecent(n) => {
                let skip = rows.len().saturating_sub(n);
                rows.drain(..skip);
            }
            MeasurementQuery::Range { since, until } => {
                rows.retain(|m| m.timestamp >= since && m.timestamp < until);
            }
        }
        Ok(rows)
    }

    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut measurements = self
            .measurements
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        let before = measurements.len();
        measurements.retain(|m| m.timestamp >= cutoff);
        Ok((before - measurements.len()) as u64)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(minutes_ago: i64, response_time_ms: u64) -> Measurement {
        let mut m = Measurement::success("buffer", response_time_ms);
        m.timestamp = Utc::now() - TimeDelta::minutes(minutes_ago);
        m
    }

    #[test]
    fn new_creates_empty_store() {
        let store = InMemoryStore::new();
        let rows = store.query("buffer", &MeasurementQuery::All).expect("query");
        assert!(rows.is_empty());
    }

    #[test]
    fn query_returns_only_the_requested_process() {
        let store = InMemoryStore::new();
        store.append(&Measurement::success("alpha", 10)).expect("append");
        store.append(&Measurement::success("beta", 20)).expect("append");

        let rows = store.query("alpha", &MeasurementQuery::All).expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].process, "alpha");
    }

    #[test]
    fn query_orders_by_ascending_timestamp() {
        let store = InMemoryStore::new();
        store.append(&at(1, 30)).expect("append");
        store.append(&at(10, 10)).expect("append");
        store.append(&at(5, 20)).expect("append");

        let rows = store.query("buffer", &MeasurementQuery::All).expect("query");
        let times: Vec<_> = rows.iter().map(|m| m.response_time_ms).collect();
        assert_eq!(times, vec![Some(10), Some(20), Some(30)]);
    }

    #[test]
    fn most_recent_keeps_the_newest_in_ascending_order() {
        let store = InMemoryStore::new();
        for minutes_ago in [40, 30, 20, 10] {
            store.append(&at(minutes_ago, minutes_ago as u64)).expect("append");
        }

        let rows = store
            .query("buffer", &MeasurementQuery::MostRecent(2))
            .expect("query");
        let times: Vec<_> = rows.iter().map(|m| m.response_time_ms).collect();
        assert_eq!(times, vec![Some(20), Some(10)]);
    }

    #[test]
    fn most_recent_larger_than_history_returns_everything() {
        let store = InMemoryStore::new();
        store.append(&at(1, 10)).expect("append");

        let rows = store
            .query("buffer", &MeasurementQuery::MostRecent(100))
            .expect("query");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn range_is_inclusive_since_exclusive_until() {
        let store = InMemoryStore::new();
        let since = Utc::now() - TimeDelta::minutes(20);
        let until = Utc::now() - TimeDelta::minutes(10);
        store.append(&at(25, 1)).expect("append");
        store.append(&at(20, 2)).expect("append"); // exactly at since
        store.append(&at(15, 3)).expect("append");
        store.append(&at(5, 4)).expect("append");

        let rows = store
            .query("buffer", &MeasurementQuery::Range { since, until })
            .expect("query");
        let times: Vec<_> = rows.iter().map(|m| m.response_time_ms).collect();
        assert_eq!(times, vec![Some(2), Some(3)]);
    }

    #[test]
    fn delete_older_than_is_strict_and_spans_processes() {
        let store = InMemoryStore::new();
        let cutoff = Utc::now() - TimeDelta::hours(1);

        let mut old_alpha = Measurement::success("alpha", 1);
        old_alpha.timestamp = cutoff - TimeDelta::minutes(1);
        let mut boundary = Measurement::success("alpha", 2);
        boundary.timestamp = cutoff;
        let mut old_beta = Measurement::success("beta", 3);
        old_beta.timestamp = cutoff - TimeDelta::hours(5);
        let fresh = Measurement::success("beta", 4);

        for m in [&old_alpha, &boundary, &old_beta, &fresh] {
            store.append(m).expect("append");
        }

        let deleted = store.delete_older_than(cutoff).expect("delete");
        assert_eq!(deleted, 2);

        // The record exactly at the cutoff survives
        let alpha = store.query("alpha", &MeasurementQuery::All).expect("query");
        assert_eq!(alpha.len(), 1);
        assert_eq!(alpha[0].response_time_ms, Some(2));
        let beta = store.query("beta", &MeasurementQuery::All).expect("query");
        assert_eq!(beta.len(), 1);
    }

    #[test]
    fn default_creates_same_as_new() {
        let store = InMemoryStore::default();
        let rows = store.query("buffer", &MeasurementQuery::All).expect("query");
        assert!(rows.is_empty());
    }
}
