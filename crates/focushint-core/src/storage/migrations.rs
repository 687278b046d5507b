//! Database schema migrations for focushint.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: activity log, hints and per-device preferences.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS activity_logs (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            device_id        TEXT NOT NULL,
            app_name         TEXT NOT NULL,
            window_title     TEXT,
            started_at       TEXT NOT NULL,
            ended_at         TEXT,
            duration_seconds REAL,
            idle_seconds     REAL,
            might_be_stuck   INTEGER,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS hints (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            device_id    TEXT NOT NULL,
            category     TEXT NOT NULL,
            priority     TEXT NOT NULL,
            title        TEXT NOT NULL,
            message      TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'pending',
            created_at   TEXT NOT NULL,
            shown_at     TEXT,
            dismissed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS user_preferences (
            id                         INTEGER PRIMARY KEY AUTOINCREMENT,
            device_id                  TEXT NOT NULL UNIQUE,
            work_session_minutes       INTEGER NOT NULL,
            max_hints_per_hour         INTEGER NOT NULL,
            enable_break_reminders     INTEGER NOT NULL,
            enable_app_suggestions     INTEGER NOT NULL,
            enable_workflow_tips       INTEGER NOT NULL,
            break_interval_minutes     INTEGER NOT NULL,
            session_duration_minutes   INTEGER NOT NULL,
            same_app_threshold_minutes INTEGER NOT NULL,
            enable_same_app_hints      INTEGER NOT NULL,
            created_at                 TEXT NOT NULL,
            updated_at                 TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_activity_device_started ON activity_logs(device_id, started_at);
        CREATE INDEX IF NOT EXISTS idx_hints_device_status ON hints(device_id, status);
        CREATE INDEX IF NOT EXISTS idx_hints_device_created ON hints(device_id, created_at);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: client-computed struggle signals on activity rows.
///
/// `recent_windows` holds a JSON array of window titles.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE activity_logs ADD COLUMN struggle_score INTEGER;
         ALTER TABLE activity_logs ADD COLUMN tab_switch_count INTEGER;
         ALTER TABLE activity_logs ADD COLUMN back_and_forth_count INTEGER;
         ALTER TABLE activity_logs ADD COLUMN context TEXT;
         ALTER TABLE activity_logs ADD COLUMN recent_windows TEXT NOT NULL DEFAULT '[]';",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}
