//! Slack transport boundary -- payload shapes, request signing, DM
//! delivery.
//!
//! Only the thin edges live here. The webhook server itself, channel
//! lookups, and event routing are outside this crate; they hand the
//! core the structs below.

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use crate::summary::Messenger;
use crate::triage::InboundMessage;

type HmacSha256 = Hmac<Sha256>;

/// Accepted clock skew for signed requests.
const SIGNATURE_WINDOW_SECS: i64 = 300;

/// Decoded slash-command payload (application/x-www-form-urlencoded).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub response_url: String,
}

/// One message event from the Events API. `channel_name` is not part of
/// the raw event; the transport fills it in when it has one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    pub channel: String,
    #[serde(default)]
    pub channel_name: String,
    pub user: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
}

impl MessageEvent {
    /// Origin timestamp from the Slack `ts` field ("seconds.fraction").
    /// Unparseable values fall back to now.
    pub fn sent_at(&self) -> DateTime<Utc> {
        self.ts
            .parse::<f64>()
            .ok()
            .and_then(|secs| Utc.timestamp_millis_opt((secs * 1000.0) as i64).single())
            .unwrap_or_else(Utc::now)
    }

    pub fn into_inbound(self) -> InboundMessage {
        let sent_at = self.sent_at();
        InboundMessage {
            channel_id: self.channel,
            channel_name: self.channel_name,
            sender_id: self.user,
            sender_name: self.user_name,
            text: self.text,
            sent_at,
        }
    }
}

/// Verify a `v0` request signature (HMAC-SHA256 over
/// `v0:{timestamp}:{body}`), rejecting requests outside the replay
/// window around `now`.
pub fn verify_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &str,
    signature: &str,
    now: DateTime<Utc>,
) -> bool {
    let Ok(ts) = timestamp.parse::<i64>() else {
        return false;
    };
    if (now.timestamp() - ts).abs() > SIGNATURE_WINDOW_SECS {
        return false;
    }
    let Some(hex_sig) = signature.strip_prefix("v0=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(signing_secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("v0:{timestamp}:{body}").as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// DM delivery via chat.postMessage.
#[derive(Clone)]
pub struct SlackMessenger {
    bot_token: String,
}

impl SlackMessenger {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
        }
    }
}

impl Messenger for SlackMessenger {
    fn send_dm(&self, user_id: &str, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.bot_token.is_empty() {
            return Err("Slack bot token not configured.".into());
        }

        let client = Client::new();
        let body = json!({ "channel": user_id, "text": text });

        let resp = tokio::runtime::Handle::current().block_on(
            client
                .post("https://slack.com/api/chat.postMessage")
                .header("Authorization", format!("Bearer {}", self.bot_token))
                .json(&body)
                .send(),
        )?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(format!("Slack chat.postMessage error: HTTP {status}").into());
        }

        let data: serde_json::Value = tokio::runtime::Handle::current().block_on(resp.json())?;
        if data.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let err = data
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(format!("Slack chat.postMessage failed: {err}").into());
        }
        Ok(())
    }
}
