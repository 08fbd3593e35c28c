use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::measurement::Measurement;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// Which measurements of a process to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementQuery {
    /// Every stored measurement.
    All,
    /// The most recent `n` measurements.
    MostRecent(usize),
    /// Measurements with `since <= timestamp < until`.
    Range {
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    },
}

/// Persistence boundary for measurements. Each call is transactional on its
/// own; no operation in the core spans multiple calls.
pub trait MeasurementStore: Send + Sync {
    /// Persist one measurement.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write operation fails.
    fn append(&self, measurement: &Measurement) -> Result<(), StoreError>;

    /// Read measurements for one process, ordered by ascending timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn query(
        &self,
        process: &str,
        query: &MeasurementQuery,
    ) -> Result<Vec<Measurement>, StoreError>;

    /// Delete every measurement with a timestamp strictly older than
    /// `cutoff`, across all processes. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete operation fails.
    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
