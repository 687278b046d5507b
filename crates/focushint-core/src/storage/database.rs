//! SQLite-based storage for activity, hints and preferences.
//!
//! Provides persistent storage for:
//! - Reported activity events
//! - Hints and their lifecycle
//! - Per-device user preferences
//!
//! Timestamps are written as fixed-width RFC 3339 UTC text with microsecond
//! precision, so comparing the text compares the instants.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::data_dir;
use super::migrations;
use crate::activity::{ActivityEvent, ActivityReportItem};
use crate::error::{CoreError, DatabaseError, Result};
use crate::hint::{Hint, HintDraft, HintStatus, RecentHint};
use crate::preferences::{PreferenceDefaults, PreferencesPatch, UserPreferences};

const ACTIVITY_COLUMNS: &str = "id, device_id, app_name, window_title, started_at, ended_at,
    duration_seconds, idle_seconds, might_be_stuck, struggle_score, tab_switch_count,
    back_and_forth_count, context, recent_windows, created_at";

const HINT_COLUMNS: &str =
    "id, device_id, category, priority, title, message, status, created_at, shown_at, dismissed_at";

const PREFERENCE_COLUMNS: &str = "id, device_id, work_session_minutes, max_hints_per_hour,
    enable_break_reminders, enable_app_suggestions, enable_workflow_tips,
    break_interval_minutes, session_duration_minutes, same_app_threshold_minutes,
    enable_same_app_hints, created_at, updated_at";

/// Canonical text form of a timestamp.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn opt_ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

fn parsed_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| conversion_error(idx, e))
}

fn row_to_activity(row: &Row<'_>) -> rusqlite::Result<ActivityEvent> {
    let windows: String = row.get(13)?;
    Ok(ActivityEvent {
        id: row.get(0)?,
        device_id: row.get(1)?,
        app_name: row.get(2)?,
        window_title: row.get(3)?,
        started_at: ts_at(row, 4)?,
        ended_at: opt_ts_at(row, 5)?,
        duration_seconds: row.get(6)?,
        idle_seconds: row.get(7)?,
        might_be_stuck: row.get(8)?,
        struggle_score: row.get(9)?,
        tab_switch_count: row.get(10)?,
        back_and_forth_count: row.get(11)?,
        context: row.get(12)?,
        recent_windows: serde_json::from_str(&windows).map_err(|e| conversion_error(13, e))?,
        created_at: ts_at(row, 14)?,
    })
}

fn row_to_hint(row: &Row<'_>) -> rusqlite::Result<Hint> {
    Ok(Hint {
        id: row.get(0)?,
        device_id: row.get(1)?,
        category: parsed_at(row, 2)?,
        priority: parsed_at(row, 3)?,
        title: row.get(4)?,
        message: row.get(5)?,
        status: parsed_at(row, 6)?,
        created_at: ts_at(row, 7)?,
        shown_at: opt_ts_at(row, 8)?,
        dismissed_at: opt_ts_at(row, 9)?,
    })
}

fn row_to_preferences(row: &Row<'_>) -> rusqlite::Result<UserPreferences> {
    Ok(UserPreferences {
        id: row.get(0)?,
        device_id: row.get(1)?,
        work_session_minutes: row.get(2)?,
        max_hints_per_hour: row.get(3)?,
        enable_break_reminders: row.get(4)?,
        enable_app_suggestions: row.get(5)?,
        enable_workflow_tips: row.get(6)?,
        break_interval_minutes: row.get(7)?,
        session_duration_minutes: row.get(8)?,
        same_app_threshold_minutes: row.get(9)?,
        enable_same_app_hints: row.get(10)?,
        created_at: ts_at(row, 11)?,
        updated_at: ts_at(row, 12)?,
    })
}

/// SQLite database holding activity, hints and preferences.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/focushint/focushint.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("focushint.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Activity ─────────────────────────────────────────────────────────

    /// Persist one validated report item.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_activity(
        &self,
        device_id: &str,
        item: &ActivityReportItem,
        now: DateTime<Utc>,
    ) -> Result<ActivityEvent> {
        let recent_windows = item.recent_windows.clone().unwrap_or_default();
        let windows_json = serde_json::to_string(&recent_windows)?;
        let duration_seconds = item.effective_duration_seconds();

        self.conn.execute(
            "INSERT INTO activity_logs (
                device_id, app_name, window_title, started_at, ended_at, duration_seconds,
                idle_seconds, might_be_stuck, struggle_score, tab_switch_count,
                back_and_forth_count, context, recent_windows, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                device_id,
                item.app_name,
                item.window_title,
                format_ts(item.started_at),
                item.ended_at.map(format_ts),
                duration_seconds,
                item.idle_seconds,
                item.might_be_stuck,
                item.struggle_score,
                item.tab_switch_count,
                item.back_and_forth_count,
                item.context,
                windows_json,
                format_ts(now),
            ],
        )?;

        Ok(ActivityEvent {
            id: self.conn.last_insert_rowid(),
            device_id: device_id.to_string(),
            app_name: item.app_name.clone(),
            window_title: item.window_title.clone(),
            started_at: item.started_at,
            ended_at: item.ended_at,
            duration_seconds,
            idle_seconds: item.idle_seconds,
            might_be_stuck: item.might_be_stuck,
            struggle_score: item.struggle_score,
            tab_switch_count: item.tab_switch_count,
            back_and_forth_count: item.back_and_forth_count,
            context: item.context.clone(),
            recent_windows,
            created_at: now,
        })
    }

    /// Activity that started at or after `since`, newest first.
    pub fn activities_since(
        &self,
        device_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activity_logs
             WHERE device_id = ?1 AND started_at >= ?2
             ORDER BY started_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![device_id, format_ts(since)], row_to_activity)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// The `limit` most recent activity events, newest first.
    pub fn recent_activities(&self, device_id: &str, limit: usize) -> Result<Vec<ActivityEvent>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activity_logs
             WHERE device_id = ?1
             ORDER BY started_at DESC, id DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![device_id, limit as i64], row_to_activity)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Application of the most recently inserted activity row.
    pub fn last_reported_app(&self, device_id: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT app_name FROM activity_logs WHERE device_id = ?1
                 ORDER BY id DESC LIMIT 1",
                params![device_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }

    // ── Hints ────────────────────────────────────────────────────────────

    /// Persist a new `pending` hint.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_hint(&self, device_id: &str, draft: &HintDraft, now: DateTime<Utc>) -> Result<Hint> {
        self.conn.execute(
            "INSERT INTO hints (device_id, category, priority, title, message, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                device_id,
                draft.category.as_str(),
                draft.priority.as_str(),
                draft.title,
                draft.message,
                HintStatus::Pending.as_str(),
                format_ts(now),
            ],
        )?;

        Ok(Hint {
            id: self.conn.last_insert_rowid(),
            device_id: device_id.to_string(),
            category: draft.category,
            priority: draft.priority,
            title: draft.title.clone(),
            message: draft.message.clone(),
            status: HintStatus::Pending,
            created_at: now,
            shown_at: None,
            dismissed_at: None,
        })
    }

    pub fn get_hint(&self, id: i64) -> Result<Option<Hint>> {
        let sql = format!("SELECT {HINT_COLUMNS} FROM hints WHERE id = ?1");
        Ok(self.conn.query_row(&sql, params![id], row_to_hint).optional()?)
    }

    /// Move a hint to `status`.
    ///
    /// Re-applying the current status is a no-op that keeps existing
    /// timestamps.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id and a validation error for a
    /// backwards move.
    pub fn update_hint_status(&self, id: i64, status: HintStatus, now: DateTime<Utc>) -> Result<Hint> {
        let mut hint = self
            .get_hint(id)?
            .ok_or_else(|| CoreError::not_found("hint", id))?;

        if hint.transition(status, now)? {
            self.conn.execute(
                "UPDATE hints SET status = ?1, shown_at = ?2, dismissed_at = ?3 WHERE id = ?4",
                params![
                    hint.status.as_str(),
                    hint.shown_at.map(format_ts),
                    hint.dismissed_at.map(format_ts),
                    id,
                ],
            )?;
        }
        Ok(hint)
    }

    /// Pending hints: high priority first, then oldest first.
    pub fn pending_hints(&self, device_id: &str) -> Result<Vec<Hint>> {
        let sql = format!(
            "SELECT {HINT_COLUMNS} FROM hints
             WHERE device_id = ?1 AND status = 'pending'
             ORDER BY CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                      created_at ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![device_id], row_to_hint)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Creation time of the device's newest hint, in any status.
    pub fn latest_hint_created_at(&self, device_id: &str) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self.conn.query_row(
            "SELECT MAX(created_at) FROM hints WHERE device_id = ?1",
            params![device_id],
            |row| row.get(0),
        )?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{s}': {e}")).into())
        })
        .transpose()
    }

    /// Number of hints created at or after `since`, in any status.
    pub fn count_hints_since(&self, device_id: &str, since: DateTime<Utc>) -> Result<u32> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM hints WHERE device_id = ?1 AND created_at >= ?2",
            params![device_id, format_ts(since)],
            |row| row.get::<_, u32>(0),
        )?)
    }

    /// The `limit` newest hints as repetition context.
    pub fn recent_hints(&self, device_id: &str, limit: usize) -> Result<Vec<RecentHint>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, title, message FROM hints
             WHERE device_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![device_id, limit as i64], |row| {
            Ok(RecentHint {
                category: parsed_at(row, 0)?,
                title: row.get(1)?,
                message: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Dismiss every pending or shown hint created strictly before `cutoff`.
    ///
    /// Returns the number of hints dismissed.
    pub fn dismiss_stale_hints(
        &self,
        device_id: &str,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE hints
             SET status = 'dismissed', dismissed_at = COALESCE(dismissed_at, ?3)
             WHERE device_id = ?1 AND status IN ('pending', 'shown') AND created_at < ?2",
            params![device_id, format_ts(cutoff), format_ts(now)],
        )?)
    }

    // ── Preferences ──────────────────────────────────────────────────────

    pub fn get_preferences(&self, device_id: &str) -> Result<Option<UserPreferences>> {
        let sql = format!("SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE device_id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![device_id], row_to_preferences)
            .optional()?)
    }

    /// Load the device's preferences, creating the row from `defaults` first
    /// if it does not exist.
    pub fn get_or_create_preferences(
        &self,
        device_id: &str,
        defaults: &PreferenceDefaults,
        now: DateTime<Utc>,
    ) -> Result<UserPreferences> {
        let ts = format_ts(now);
        self.conn.execute(
            "INSERT OR IGNORE INTO user_preferences (
                device_id, work_session_minutes, max_hints_per_hour, enable_break_reminders,
                enable_app_suggestions, enable_workflow_tips, break_interval_minutes,
                session_duration_minutes, same_app_threshold_minutes, enable_same_app_hints,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                device_id,
                defaults.work_session_minutes,
                defaults.max_hints_per_hour,
                defaults.enable_break_reminders,
                defaults.enable_app_suggestions,
                defaults.enable_workflow_tips,
                defaults.break_interval_minutes,
                defaults.session_duration_minutes,
                defaults.same_app_threshold_minutes,
                defaults.enable_same_app_hints,
                ts,
            ],
        )?;

        self.get_preferences(device_id)?
            .ok_or_else(|| CoreError::not_found("preferences", device_id))
    }

    /// Apply a partial update to an existing preferences row.
    ///
    /// # Errors
    /// Returns `NotFound` when the device has no preferences yet.
    pub fn update_preferences(
        &self,
        device_id: &str,
        patch: &PreferencesPatch,
        now: DateTime<Utc>,
    ) -> Result<UserPreferences> {
        let mut prefs = self
            .get_preferences(device_id)?
            .ok_or_else(|| CoreError::not_found("preferences", device_id))?;
        prefs.apply(patch, now);

        self.conn.execute(
            "UPDATE user_preferences SET
                work_session_minutes = ?1, max_hints_per_hour = ?2,
                enable_break_reminders = ?3, enable_app_suggestions = ?4,
                enable_workflow_tips = ?5, break_interval_minutes = ?6,
                session_duration_minutes = ?7, same_app_threshold_minutes = ?8,
                enable_same_app_hints = ?9, updated_at = ?10
             WHERE device_id = ?11",
            params![
                prefs.work_session_minutes,
                prefs.max_hints_per_hour,
                prefs.enable_break_reminders,
                prefs.enable_app_suggestions,
                prefs.enable_workflow_tips,
                prefs.break_interval_minutes,
                prefs.session_duration_minutes,
                prefs.same_app_threshold_minutes,
                prefs.enable_same_app_hints,
                format_ts(prefs.updated_at),
                device_id,
            ],
        )?;
        Ok(prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::hint::{HintCategory, HintPriority};
    use chrono::{Duration, SubsecRound};

    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }

    fn draft(priority: HintPriority, title: &str) -> HintDraft {
        HintDraft::new(HintCategory::WorkflowTip, priority, title, "message")
    }

    fn item(app: &str, started_at: DateTime<Utc>) -> ActivityReportItem {
        ActivityReportItem {
            app_name: app.into(),
            window_title: Some(format!("{app} window")),
            started_at,
            duration_seconds: Some(60.0),
            ..Default::default()
        }
    }

    #[test]
    fn activity_round_trips_with_struggle_fields() {
        let db = Database::open_memory().unwrap();
        let now = now();
        let mut report = item("Code", now - Duration::minutes(1));
        report.struggle_score = Some(6);
        report.recent_windows = Some(vec!["a.rs".into(), "b.rs".into()]);
        report.might_be_stuck = Some(true);

        let stored = db.insert_activity("dev", &report, now).unwrap();
        let loaded = db.recent_activities("dev", 10).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, stored.id);
        assert_eq!(loaded[0].struggle_score, Some(6));
        assert_eq!(loaded[0].recent_windows, vec!["a.rs", "b.rs"]);
        assert_eq!(loaded[0].might_be_stuck, Some(true));
        assert_eq!(db.last_reported_app("dev").unwrap().as_deref(), Some("Code"));
        assert!(db.last_reported_app("other").unwrap().is_none());
    }

    #[test]
    fn activities_since_is_windowed_and_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = now();
        db.insert_activity("dev", &item("Old", now - Duration::minutes(90)), now).unwrap();
        db.insert_activity("dev", &item("Code", now - Duration::minutes(30)), now).unwrap();
        db.insert_activity("dev", &item("Slack", now - Duration::minutes(5)), now).unwrap();
        db.insert_activity("other", &item("Mail", now), now).unwrap();

        let events = db.activities_since("dev", now - Duration::minutes(60)).unwrap();
        let apps: Vec<_> = events.iter().map(|e| e.app_name.as_str()).collect();
        assert_eq!(apps, vec!["Slack", "Code"]);
    }

    #[test]
    fn pending_hints_order_by_priority_then_age() {
        let db = Database::open_memory().unwrap();
        let t0 = now();
        db.insert_hint("dev", &draft(HintPriority::Low, "low"), t0).unwrap();
        db.insert_hint("dev", &draft(HintPriority::High, "high-new"), t0 + Duration::seconds(2)).unwrap();
        db.insert_hint("dev", &draft(HintPriority::Medium, "medium"), t0).unwrap();
        db.insert_hint("dev", &draft(HintPriority::High, "high-old"), t0 + Duration::seconds(1)).unwrap();

        let titles: Vec<_> = db
            .pending_hints("dev")
            .unwrap()
            .into_iter()
            .map(|h| h.title)
            .collect();
        assert_eq!(titles, vec!["high-old", "high-new", "medium", "low"]);
    }

    #[test]
    fn status_updates_are_monotonic_and_stamp_once() {
        let db = Database::open_memory().unwrap();
        let t0 = now();
        let hint = db.insert_hint("dev", &draft(HintPriority::Medium, "t"), t0).unwrap();

        let shown = db.update_hint_status(hint.id, HintStatus::Shown, t0).unwrap();
        assert_eq!(shown.shown_at, Some(t0));
        let again = db
            .update_hint_status(hint.id, HintStatus::Shown, t0 + Duration::seconds(9))
            .unwrap();
        assert_eq!(again.shown_at, Some(t0));

        db.update_hint_status(hint.id, HintStatus::Dismissed, t0).unwrap();
        let err = db.update_hint_status(hint.id, HintStatus::Pending, t0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidTransition { .. })
        ));

        let stored = db.get_hint(hint.id).unwrap().unwrap();
        assert_eq!(stored.status, HintStatus::Dismissed);
        assert_eq!(stored.shown_at, Some(t0));
        assert!(db.pending_hints("dev").unwrap().is_empty());
    }

    #[test]
    fn unknown_hint_is_not_found() {
        let db = Database::open_memory().unwrap();
        let err = db.update_hint_status(99, HintStatus::Shown, now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "hint", .. }));
    }

    #[test]
    fn stale_sweep_only_touches_old_open_hints() {
        let db = Database::open_memory().unwrap();
        let now = now();
        let old = db.insert_hint("dev", &draft(HintPriority::Low, "old"), now - Duration::seconds(31)).unwrap();
        let fresh = db.insert_hint("dev", &draft(HintPriority::Low, "fresh"), now - Duration::seconds(29)).unwrap();

        let swept = db
            .dismiss_stale_hints("dev", now - Duration::seconds(30), now)
            .unwrap();
        assert_eq!(swept, 1);
        let old = db.get_hint(old.id).unwrap().unwrap();
        assert_eq!(old.status, HintStatus::Dismissed);
        assert_eq!(old.dismissed_at, Some(now));
        assert_eq!(db.get_hint(fresh.id).unwrap().unwrap().status, HintStatus::Pending);
    }

    #[test]
    fn hint_counters() {
        let db = Database::open_memory().unwrap();
        let now = now();
        assert!(db.latest_hint_created_at("dev").unwrap().is_none());

        db.insert_hint("dev", &draft(HintPriority::Low, "a"), now - Duration::minutes(61)).unwrap();
        db.insert_hint("dev", &draft(HintPriority::Low, "b"), now - Duration::minutes(60)).unwrap();
        db.insert_hint("dev", &draft(HintPriority::Low, "c"), now - Duration::seconds(3)).unwrap();

        assert_eq!(db.count_hints_since("dev", now - Duration::minutes(60)).unwrap(), 2);
        assert_eq!(
            db.latest_hint_created_at("dev").unwrap(),
            Some(now - Duration::seconds(3))
        );
        let recent: Vec<_> = db
            .recent_hints("dev", 2)
            .unwrap()
            .into_iter()
            .map(|h| h.title)
            .collect();
        assert_eq!(recent, vec!["c", "b"]);
    }

    #[test]
    fn preferences_are_created_lazily_and_patched() {
        let db = Database::open_memory().unwrap();
        let now = now();
        let patch = PreferencesPatch {
            max_hints_per_hour: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            db.update_preferences("dev", &patch, now),
            Err(CoreError::NotFound { .. })
        ));

        let created = db
            .get_or_create_preferences("dev", &PreferenceDefaults::default(), now)
            .unwrap();
        assert_eq!(created.max_hints_per_hour, 10);

        let again = db
            .get_or_create_preferences("dev", &PreferenceDefaults::default(), now)
            .unwrap();
        assert_eq!(again.id, created.id);

        let later = now + Duration::minutes(1);
        let updated = db.update_preferences("dev", &patch, later).unwrap();
        assert_eq!(updated.max_hints_per_hour, 3);
        assert_eq!(updated.updated_at, later);
        assert_eq!(db.get_preferences("dev").unwrap().unwrap(), updated);
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hints.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.insert_hint("dev", &draft(HintPriority::High, "persisted"), now())
                .unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.pending_hints("dev").unwrap().len(), 1);
    }
}
