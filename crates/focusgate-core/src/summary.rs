//! Batch summary composition and delivery.
//!
//! Turns the held items drained at session end into one channel-grouped
//! digest and sends it as a DM. Delivery is fire-and-forget relative to
//! the user-facing acknowledgment: a failed send is logged, never
//! retried, never surfaced.

use std::collections::HashMap;
use std::sync::Arc;

use crate::storage::HeldItem;

/// Sent when a session ends with nothing held.
pub const NO_MESSAGES_TEXT: &str =
    "\u{1F389} No messages were held while you were focused. All clear!";

const MAX_ITEMS_PER_CHANNEL: usize = 5;
const PREVIEW_CHARS: usize = 80;

/// The external DM capability.
pub trait Messenger: Send + Sync {
    /// Deliver a direct message to the given user.
    fn send_dm(&self, user_id: &str, text: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// Compose the digest for a drained session.
///
/// Channels appear in first-seen order; items within a channel keep
/// their chronological order. At most five lines per channel, then an
/// "...and N more" marker.
pub fn compose_summary(items: &[HeldItem]) -> String {
    if items.is_empty() {
        return NO_MESSAGES_TEXT.to_string();
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&HeldItem>> = HashMap::new();
    for item in items {
        let key = if item.channel_name.is_empty() {
            item.channel_id.as_str()
        } else {
            item.channel_name.as_str()
        };
        let group = groups.entry(key).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(item);
    }

    let total = items.len();
    let mut out = format!(
        "\u{1F4EC} While you were focused, I held {total} message{}:\n",
        plural(total)
    );
    for key in order {
        let group = &groups[key];
        out.push_str(&format!("\n*#{key}* ({})\n", group.len()));
        for item in group.iter().take(MAX_ITEMS_PER_CHANNEL) {
            let sender = if item.sender_name.is_empty() {
                item.sender_id.as_str()
            } else {
                item.sender_name.as_str()
            };
            out.push_str(&format!(
                "{} {}: {}\n",
                item.urgency.emoji(),
                sender,
                preview(&item.body)
            ));
        }
        if group.len() > MAX_ITEMS_PER_CHANNEL {
            out.push_str(&format!(
                "...and {} more\n",
                group.len() - MAX_ITEMS_PER_CHANNEL
            ));
        }
    }
    out
}

/// Compose and deliver the digest now, logging and swallowing send
/// failures.
pub fn deliver_summary(messenger: &dyn Messenger, user_id: &str, items: &[HeldItem]) {
    let text = compose_summary(items);
    if let Err(e) = messenger.send_dm(user_id, &text) {
        log::warn!("summary DM to {user_id} failed: {e}");
    }
}

/// Fire-and-forget delivery: the caller's acknowledgment must not wait
/// on the DM. Must be called from within a tokio runtime.
pub fn dispatch_summary(messenger: Arc<dyn Messenger>, user_id: String, items: Vec<HeldItem>) {
    let _ = tokio::task::spawn_blocking(move || {
        deliver_summary(messenger.as_ref(), &user_id, &items);
    });
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{truncated}\u{2026}")
    }
}
