use rusqlite::Connection;

/// Initialize the database schema, creating tables if they don't exist.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS measurements (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            process          TEXT    NOT NULL,
            recorded_at      TEXT    NOT NULL,
            success          INTEGER NOT NULL,
            response_time_ms INTEGER,
            failure          TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_measurements_process_recorded_at
            ON measurements(process, recorded_at);
        CREATE INDEX IF NOT EXISTS idx_measurements_recorded_at
            ON measurements(recorded_at);",
    )?;
    Ok(())
}
