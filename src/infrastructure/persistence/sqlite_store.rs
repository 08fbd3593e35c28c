use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::domain::entities::measurement::{FailureKind, Measurement};
use crate::domain::ports::store::{MeasurementQuery, MeasurementStore, StoreError};

use super::migrations;

/// SQLite-backed persistent store for measurements.
///
/// Timestamps are stored as RFC 3339 text in UTC, so lexicographic
/// comparison in SQL matches chronological order and range and cutoff
/// predicates run directly against the index.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new `SQLite` store at the given path.
    ///
    /// Expands `~`, creates parent directories, opens connection,
    /// sets WAL mode and pragmas, and initializes schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the database cannot be opened or initialized.
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let expanded = shellexpand::tilde(path);
        let db_path = PathBuf::from(expanded.as_ref());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }

        let conn =
            Connection::open(&db_path).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        migrations::initialize_schema(&conn).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn parse_measurement_row(row: &rusqlite::Row<'_>) -> Result<Measurement, rusqlite::Error> {
    let process: String = row.get(0)?;
    let recorded_at: String = row.get(1)?;
    let success: bool = row.get(2)?;
    let response_time_ms: Option<u64> = row.get(3)?;
    let failure_str: Option<String> = row.get(4)?;

    let timestamp = DateTime::parse_from_rfc3339(&recorded_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let failure: Option<FailureKind> = failure_str
        .map(|s| serde_json::from_str(&format!("\"{s}\"")))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Measurement {
        process,
        timestamp,
        success,
        response_time_ms,
        failure,
    })
}

impl MeasurementStore for SqliteStore {
    fn append(&self, measurement: &Measurement) -> Result<(), StoreError> {
        let failure_str = measurement
            .failure
            .map(|kind| serde_json::to_string(&kind))
            .transpose()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?
            .map(|json| json.trim_matches('"').to_string());

        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;

        conn.execute(
            "INSERT INTO measurements (process, recorded_at, success, response_time_ms, failure) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                measurement.process,
                measurement.timestamp.to_rfc3339(),
                measurement.success,
                measurement.response_time_ms,
                failure_str,
            ],
        )
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        drop(conn);
        Ok(())
    }

    fn query(
        &self,
        process: &str,
        query: &MeasurementQuery,
    ) -> Result<Vec<Measurement>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?;

        let rows = match *query {
            MeasurementQuery::All => {
                let mut stmt = conn
                    .prepare(
                        "SELECT process, recorded_at, success, response_time_ms, failure \
                         FROM measurements WHERE process = ?1 ORDER BY recorded_at ASC, id ASC",
                    )
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
                let rows = stmt
                    .query_map(params![process], parse_measurement_row)
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
                drop(stmt);
                rows
            }
            MeasurementQuery::MostRecent(n) => {
                let limit =
                    i64::try_from(n).map_err(|e| StoreError::ReadFailed(e.to_string()))?;
                // Newest n, then flipped back to ascending order
                let mut stmt = conn
                    .prepare(
                        "SELECT process, recorded_at, success, response_time_ms, failure \
                         FROM (SELECT * FROM measurements WHERE process = ?1 \
                               ORDER BY recorded_at DESC, id DESC LIMIT ?2) \
                         ORDER BY recorded_at ASC, id ASC",
                    )
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
                let rows = stmt
                    .query_map(params![process, limit], parse_measurement_row)
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
                drop(stmt);
                rows
            }
            MeasurementQuery::Range { since, until } => {
                let mut stmt = conn
                    .prepare(
                        "SELECT process, recorded_at, success, response_time_ms, failure \
                         FROM measurements \
                         WHERE process = ?1 AND recorded_at >= ?2 AND recorded_at < ?3 \
                         ORDER BY recorded_at ASC, id ASC",
                    )
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
                let rows = stmt
                    .query_map(
                        params![process, since.to_rfc3339(), until.to_rfc3339()],
                        parse_measurement_row,
                    )
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
                drop(stmt);
                rows
            }
        };

        drop(conn);
        Ok(rows)
    }

    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;

        let deleted = conn
            .execute(
                "DELETE FROM measurements WHERE recorded_at < ?1",
                params![cutoff.to_rfc3339()],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        drop(conn);
        Ok(deleted as u64)
    }
}
