//! HTTP client for the hosted urgency-classification oracle.
//!
//! The oracle is a chat-completion endpoint given a fixed instruction
//! template and expected to answer with a single JSON object. The
//! verdict schema is strict: unexpected fields or an unknown urgency
//! value are treated the same as a failed call.

use std::time::Duration;

use indoc::indoc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{Classification, UrgencyLevel};
use crate::error::ClassifyError;
use crate::storage::OracleConfig;

const PROMPT_TEMPLATE: &str = indoc! {r#"
    You triage chat messages for a user who is in focus mode. Classify the
    urgency of the message below as exactly one of:

    - "low": FYI, social chatter, anything that can comfortably wait hours
    - "medium": a real question or request, fine to answer after focus ends
    - "high": time-sensitive and important, but not an emergency
    - "urgent": an emergency or blocker that needs the user right now

    Channel: #{channel}
    From: {sender}
    Message: {message}

    Respond with a single JSON object and nothing else, in this exact shape:
    {"urgency": "low|medium|high|urgent", "reason": "one short sentence", "shouldInterrupt": true_or_false}
"#};

/// Strict wire schema for the oracle's verdict JSON.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct OracleVerdict {
    urgency: String,
    reason: String,
    #[allow(dead_code)]
    should_interrupt: bool,
}

/// Client for one oracle endpoint.
pub struct OracleClient {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: Client,
}

impl OracleClient {
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: Client::new(),
        }
    }

    /// Ask the oracle for a verdict on one message.
    ///
    /// # Errors
    /// Returns an error for transport failures, non-success statuses,
    /// and responses that do not match the strict verdict schema. The
    /// caller converts all of these into the medium-urgency fallback.
    pub fn classify(
        &self,
        text: &str,
        channel_name: &str,
        sender_name: &str,
    ) -> Result<Classification, ClassifyError> {
        let prompt = PROMPT_TEMPLATE
            .replace("{channel}", channel_name)
            .replace("{sender}", sender_name)
            .replace("{message}", text);

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0,
        });

        let resp = tokio::runtime::Handle::current()
            .block_on(
                self.client
                    .post(&self.endpoint)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .timeout(self.timeout)
                    .json(&body)
                    .send(),
            )
            .map_err(|e| ClassifyError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClassifyError::Http {
                status: resp.status().as_u16(),
            });
        }

        let data: serde_json::Value = tokio::runtime::Handle::current()
            .block_on(resp.json())
            .map_err(|e| ClassifyError::Request(e.to_string()))?;

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ClassifyError::MalformedVerdict("missing message content".to_string()))?;

        let verdict: OracleVerdict = serde_json::from_str(content.trim())
            .map_err(|e| ClassifyError::MalformedVerdict(e.to_string()))?;

        let urgency = UrgencyLevel::parse(&verdict.urgency).ok_or_else(|| {
            ClassifyError::MalformedVerdict(format!("unknown urgency level '{}'", verdict.urgency))
        })?;

        // shouldInterrupt is recomputed by the caller; carry it through
        // so the override stays in one place.
        Ok(Classification {
            urgency,
            reason: verdict.reason,
            should_interrupt: urgency == UrgencyLevel::Urgent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_substitutes_context() {
        let prompt = PROMPT_TEMPLATE
            .replace("{channel}", "incidents")
            .replace("{sender}", "alice")
            .replace("{message}", "the deploy is stuck");
        assert!(prompt.contains("Channel: #incidents"));
        assert!(prompt.contains("From: alice"));
        assert!(prompt.contains("Message: the deploy is stuck"));
    }

    #[test]
    fn verdict_schema_rejects_unknown_fields() {
        let err = serde_json::from_str::<OracleVerdict>(
            r#"{"urgency":"low","reason":"x","shouldInterrupt":false,"confidence":0.9}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn verdict_schema_accepts_expected_shape() {
        let verdict: OracleVerdict = serde_json::from_str(
            r#"{"urgency":"high","reason":"deadline","shouldInterrupt":true}"#,
        )
        .unwrap();
        assert_eq!(verdict.urgency, "high");
        assert_eq!(verdict.reason, "deadline");
    }
}
