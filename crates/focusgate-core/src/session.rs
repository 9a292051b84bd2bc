//! Focus-session lifecycle.
//!
//! Per user the states are {no-session, active, expired-unread}.
//! "Expired" is never stored -- it is the read-time condition of a row
//! with `active = 1` and a deadline in the past, and every active-
//! session query filters such rows out, so expiry heals itself without
//! a background sweeper.

use chrono::Utc;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::storage::{Database, FocusSession, HeldItem};

/// State machine over the session store. Stateless between calls; the
/// store is the only coordination point.
pub struct SessionManager<'a> {
    db: &'a Database,
}

impl<'a> SessionManager<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Start a focus session of `duration_ms` for the user.
    ///
    /// Any prior active session is force-ended first and its held items
    /// returned, exactly as if [`end`](Self::end) had been called on it.
    /// The caller-level duration checks usually prevent reaching that
    /// path, but it keeps `start` safe under races.
    ///
    /// # Errors
    /// Returns an error if a store write fails.
    pub fn start(
        &self,
        user_id: &str,
        duration_ms: i64,
    ) -> Result<(FocusSession, Vec<HeldItem>), DatabaseError> {
        let drained = self.end(user_id)?;

        let now = Utc::now();
        let session = FocusSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            start_time: now,
            end_time: now + chrono::Duration::milliseconds(duration_ms),
            active: true,
            created_at: now,
        };
        self.db.insert_session(&session)?;
        Ok((session, drained))
    }

    /// The user's single active, unexpired session, if any.
    ///
    /// Store read failures are treated as absence, not escalated.
    pub fn get_active(&self, user_id: &str) -> Option<FocusSession> {
        match self.db.active_session(user_id, Utc::now()) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("active-session lookup failed for {user_id}: {e}");
                None
            }
        }
    }

    /// End the user's active session and return its held items, oldest
    /// receipt first. No active session yields an empty list.
    ///
    /// # Errors
    /// Returns an error if deactivation or the held-item read fails.
    pub fn end(&self, user_id: &str) -> Result<Vec<HeldItem>, DatabaseError> {
        let Some(session) = self.get_active(user_id) else {
            return Ok(Vec::new());
        };
        self.db.deactivate_session(&session.id)?;
        let items = self.db.held_items(&session.id)?;
        Ok(items)
    }
}
