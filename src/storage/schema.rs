//! SQLite schema for the study store.

use rusqlite::Connection;

/// Current schema version
pub const CURRENT_VERSION: &str = "1.0.0";

/// Configure pragmas and create tables if they don't exist.
pub fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA foreign_keys = ON;
         PRAGMA temp_store = MEMORY;",
    )?;

    conn.execute_batch(SCHEMA_SQL)?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))?;
    if count == 0 {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_VERSION],
        )?;
    }

    Ok(())
}

/// Version recorded in the database
pub fn schema_version(conn: &Connection) -> Result<String, rusqlite::Error> {
    conn.query_row(
        "SELECT version FROM schema_version ORDER BY rowid DESC LIMIT 1",
        [],
        |row| row.get(0),
    )
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS studies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    direction TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    study_id INTEGER NOT NULL,
    number INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'running',
    value REAL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    UNIQUE (study_id, number),
    FOREIGN KEY (study_id) REFERENCES studies(id)
);
CREATE INDEX IF NOT EXISTS idx_trials_study ON trials(study_id);
CREATE INDEX IF NOT EXISTS idx_trials_status ON trials(status);

CREATE TABLE IF NOT EXISTS trial_params (
    trial_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    value REAL NOT NULL,
    PRIMARY KEY (trial_id, name),
    FOREIGN KEY (trial_id) REFERENCES trials(id)
);

CREATE TABLE IF NOT EXISTS trial_attrs (
    trial_id INTEGER NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (trial_id, key),
    FOREIGN KEY (trial_id) REFERENCES trials(id)
);
";
