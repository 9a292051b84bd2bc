//! Hold-or-pass triage for messages arriving during a focus session.
//!
//! Each inbound message is an independent unit of work: look up the
//! active session, classify, then either persist a held item or let the
//! message through. The audit-log write at the end is best-effort and
//! never changes the disposition.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::classify::{Classification, Classifier};
use crate::session::SessionManager;
use crate::storage::{Database, HeldItem, NotificationRecord};

/// Longest message preview kept in the audit log.
const PREVIEW_CHARS: usize = 100;

/// One inbound chat message addressed to a focus-mode user.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: String,
    pub channel_name: String,
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// What happened to one triaged message.
#[derive(Debug, Clone)]
pub enum Disposition {
    /// The recipient has no active session; deliver as normal.
    NotInFocus,
    /// Classified as interrupt-worthy (or the hold write failed);
    /// delivered immediately.
    PassedThrough(Classification),
    /// Suppressed and recorded against the active session.
    Held(Classification),
}

pub struct TriagePipeline<'a> {
    db: &'a Database,
    classifier: &'a Classifier,
}

impl<'a> TriagePipeline<'a> {
    pub fn new(db: &'a Database, classifier: &'a Classifier) -> Self {
        Self { db, classifier }
    }

    /// Triage one message for one recipient. Runs to completion; never
    /// errors.
    pub fn triage(&self, user_id: &str, message: &InboundMessage) -> Disposition {
        let sessions = SessionManager::new(self.db);
        let Some(session) = sessions.get_active(user_id) else {
            return Disposition::NotInFocus;
        };

        let verdict =
            self.classifier
                .classify(&message.text, &message.channel_name, &message.sender_name);

        let held = if verdict.should_interrupt {
            false
        } else {
            let item = HeldItem {
                id: Uuid::new_v4().to_string(),
                session_id: session.id.clone(),
                channel_id: message.channel_id.clone(),
                channel_name: message.channel_name.clone(),
                sender_id: message.sender_id.clone(),
                sender_name: message.sender_name.clone(),
                body: message.text.clone(),
                sent_at: message.sent_at,
                urgency: verdict.urgency,
                reason: verdict.reason.clone(),
                received_at: Utc::now(),
            };
            match self.db.insert_held_item(&item) {
                Ok(()) => true,
                Err(e) => {
                    // A store failure must not suppress the message.
                    log::warn!("failed to hold message for {user_id}, passing through: {e}");
                    false
                }
            }
        };

        let record = NotificationRecord {
            user_id: user_id.to_string(),
            channel_id: message.channel_id.clone(),
            sender_id: message.sender_id.clone(),
            preview: preview(&message.text),
            urgency: verdict.urgency,
            was_held: held,
            created_at: Utc::now(),
        };
        if let Err(e) = self.db.log_notification(&record) {
            log::warn!("notification log write failed for {user_id}: {e}");
        }

        if held {
            Disposition::Held(verdict)
        } else {
            Disposition::PassedThrough(verdict)
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        text.chars().take(PREVIEW_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::UrgencyLevel;
    use crate::session::SessionManager;

    const HOUR_MS: i64 = 60 * 60_000;

    fn message(text: &str) -> InboundMessage {
        InboundMessage {
            channel_id: "C1".to_string(),
            channel_name: "general".to_string(),
            sender_id: "U2".to_string(),
            sender_name: "alice".to_string(),
            text: text.to_string(),
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn no_session_means_no_triage() {
        let db = Database::open_memory().unwrap();
        let classifier = Classifier::without_oracle();
        let pipeline = TriagePipeline::new(&db, &classifier);
        assert!(matches!(
            pipeline.triage("U1", &message("hello")),
            Disposition::NotInFocus
        ));
        // nothing was logged either
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM notification_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn low_urgency_message_is_held_and_logged() {
        let db = Database::open_memory().unwrap();
        let sessions = SessionManager::new(&db);
        let (session, _) = sessions.start("U1", HOUR_MS).unwrap();
        let classifier = Classifier::without_oracle();
        let pipeline = TriagePipeline::new(&db, &classifier);

        let disposition = pipeline.triage("U1", &message("got a minute this afternoon?"));
        let Disposition::Held(verdict) = &disposition else {
            panic!("expected Held, got {disposition:?}");
        };
        assert_eq!(verdict.urgency, UrgencyLevel::Low);

        let items = db.held_items(&session.id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sender_name, "alice");

        let was_held: i64 = db
            .conn()
            .query_row("SELECT was_held FROM notification_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(was_held, 1);
    }

    #[test]
    fn urgent_message_passes_through_unheld() {
        let db = Database::open_memory().unwrap();
        let sessions = SessionManager::new(&db);
        let (session, _) = sessions.start("U1", HOUR_MS).unwrap();
        let classifier = Classifier::without_oracle();
        let pipeline = TriagePipeline::new(&db, &classifier);

        let disposition = pipeline.triage("U1", &message("prod is down!"));
        assert!(matches!(disposition, Disposition::PassedThrough(_)));
        assert!(db.held_items(&session.id).unwrap().is_empty());

        let was_held: i64 = db
            .conn()
            .query_row("SELECT was_held FROM notification_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(was_held, 0);
    }

    #[test]
    fn audit_preview_is_truncated() {
        let db = Database::open_memory().unwrap();
        SessionManager::new(&db).start("U1", HOUR_MS).unwrap();
        let classifier = Classifier::without_oracle();
        let pipeline = TriagePipeline::new(&db, &classifier);

        let long = "x".repeat(250);
        pipeline.triage("U1", &message(&long));
        let stored: String = db
            .conn()
            .query_row("SELECT preview FROM notification_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored.chars().count(), 100);
    }
}
