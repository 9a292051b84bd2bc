//! SQLite-backed session store.
//!
//! Provides persistent storage for:
//! - Focus sessions (at most one active+unexpired per user by query contract)
//! - Held items suppressed during a session
//! - The append-only notification audit log
//!
//! Only row-level operations live here; the session state machine sits
//! on top in [`crate::session`]. Timestamps are RFC 3339 text, which
//! compares correctly as strings for same-offset values.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::classify::UrgencyLevel;
use crate::error::{CoreError, DatabaseError};

/// One user's focus window, active or historical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl FocusSession {
    /// Milliseconds until the deadline, clamped at zero.
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.end_time - now).num_milliseconds().max(0)
    }
}

/// One message suppressed during a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldItem {
    pub id: String,
    pub session_id: String,
    pub channel_id: String,
    pub channel_name: String,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    /// When the message was originally sent.
    pub sent_at: DateTime<Utc>,
    pub urgency: UrgencyLevel,
    pub reason: String,
    /// When the triage pipeline received it.
    pub received_at: DateTime<Utc>,
}

/// Audit record for one message evaluated during a session.
/// Append-only; never read back by core logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub user_id: String,
    pub channel_id: String,
    pub sender_id: String,
    /// Truncated message preview, at most 100 characters.
    pub preview: String,
    pub urgency: UrgencyLevel,
    pub was_held: bool,
    pub created_at: DateTime<Utc>,
}

/// SQLite database for sessions, held items, and the audit log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/focusgate/focusgate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = super::data_dir()?.join("focusgate.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS focus_sessions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                start_time  TEXT NOT NULL,
                end_time    TEXT NOT NULL,
                active      INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS held_items (
                id           TEXT PRIMARY KEY,
                session_id   TEXT NOT NULL,
                channel_id   TEXT NOT NULL,
                channel_name TEXT NOT NULL DEFAULT '',
                sender_id    TEXT NOT NULL,
                sender_name  TEXT NOT NULL DEFAULT '',
                body         TEXT NOT NULL,
                sent_at      TEXT NOT NULL,
                urgency      TEXT NOT NULL,
                reason       TEXT NOT NULL DEFAULT '',
                received_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notification_log (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                sender_id  TEXT NOT NULL,
                preview    TEXT NOT NULL,
                urgency    TEXT NOT NULL,
                was_held   INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_focus_sessions_user_active
                ON focus_sessions(user_id, active, end_time);
            CREATE INDEX IF NOT EXISTS idx_held_items_session
                ON held_items(session_id, received_at);",
        )?;
        Ok(())
    }

    /// Insert a new session row.
    pub fn insert_session(&self, session: &FocusSession) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO focus_sessions (id, user_id, start_time, end_time, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.user_id,
                session.start_time.to_rfc3339(),
                session.end_time.to_rfc3339(),
                session.active as i64,
                session.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Clear a session's active flag.
    pub fn deactivate_session(&self, session_id: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE focus_sessions SET active = 0 WHERE id = ?1",
            params![session_id],
        )?;
        Ok(())
    }

    /// The user's most-recently-started active, unexpired session.
    ///
    /// Expired rows (active but past their deadline) are filtered out
    /// here rather than swept by a background job.
    pub fn active_session(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<FocusSession>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_time, end_time, active, created_at
             FROM focus_sessions
             WHERE user_id = ?1 AND active = 1 AND end_time > ?2
             ORDER BY start_time DESC
             LIMIT 1",
        )?;
        let result = stmt.query_row(params![user_id, now.to_rfc3339()], |row| {
            Ok(FocusSession {
                id: row.get(0)?,
                user_id: row.get(1)?,
                start_time: parse_ts(row.get(2)?)?,
                end_time: parse_ts(row.get(3)?)?,
                active: row.get::<_, i64>(4)? != 0,
                created_at: parse_ts(row.get(5)?)?,
            })
        });
        match result {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert a held-item row.
    pub fn insert_held_item(&self, item: &HeldItem) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO held_items (id, session_id, channel_id, channel_name, sender_id,
                                     sender_name, body, sent_at, urgency, reason, received_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                item.id,
                item.session_id,
                item.channel_id,
                item.channel_name,
                item.sender_id,
                item.sender_name,
                item.body,
                item.sent_at.to_rfc3339(),
                item.urgency.as_str(),
                item.reason,
                item.received_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All held items for a session, oldest receipt first.
    pub fn held_items(&self, session_id: &str) -> Result<Vec<HeldItem>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, channel_id, channel_name, sender_id, sender_name,
                    body, sent_at, urgency, reason, received_at
             FROM held_items
             WHERE session_id = ?1
             ORDER BY received_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok(HeldItem {
                id: row.get(0)?,
                session_id: row.get(1)?,
                channel_id: row.get(2)?,
                channel_name: row.get(3)?,
                sender_id: row.get(4)?,
                sender_name: row.get(5)?,
                body: row.get(6)?,
                sent_at: parse_ts(row.get(7)?)?,
                urgency: UrgencyLevel::parse(&row.get::<_, String>(8)?)
                    .unwrap_or(UrgencyLevel::Low),
                reason: row.get(9)?,
                received_at: parse_ts(row.get(10)?)?,
            })
        })?;
        rows.collect()
    }

    /// Append one audit-log row.
    pub fn log_notification(&self, record: &NotificationRecord) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO notification_log (user_id, channel_id, sender_id, preview, urgency,
                                           was_held, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.user_id,
                record.channel_id,
                record.sender_id,
                record.preview,
                record.urgency.as_str(),
                record.was_held as i64,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

fn parse_ts(value: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}
