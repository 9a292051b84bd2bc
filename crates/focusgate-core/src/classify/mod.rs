//! Urgency classification for inbound messages.
//!
//! The primary path delegates to a hosted language-model oracle; a
//! local keyword scan is the fallback when the oracle is unconfigured
//! or the call fails. `classify` never errors -- oracle failures
//! degrade to a conservative medium-urgency verdict so that a broken
//! classifier cannot silently bury an important message as "low".

use serde::{Deserialize, Serialize};

use crate::storage::OracleConfig;

pub mod oracle;

pub use oracle::OracleClient;

/// Ordered urgency levels. Only `Urgent` carries interrupt-now semantics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Urgent,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
            UrgencyLevel::Urgent => "urgent",
        }
    }

    /// Strict parse of the lowercase level names.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(UrgencyLevel::Low),
            "medium" => Some(UrgencyLevel::Medium),
            "high" => Some(UrgencyLevel::High),
            "urgent" => Some(UrgencyLevel::Urgent),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            UrgencyLevel::Urgent => "\u{1F534}",
            UrgencyLevel::High => "\u{1F7E0}",
            UrgencyLevel::Medium => "\u{1F7E1}",
            UrgencyLevel::Low => "\u{1F7E2}",
        }
    }
}

/// One urgency verdict for one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub urgency: UrgencyLevel,
    pub reason: String,
    pub should_interrupt: bool,
}

/// Keywords that force an urgent verdict on the fallback path.
const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "emergency",
    "asap",
    "down",
    "outage",
    "critical",
    "immediately",
    "911",
    "help now",
];

fn contains_urgent_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    URGENT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Oracle-backed classifier with a local keyword fallback.
pub struct Classifier {
    oracle: Option<OracleClient>,
}

impl Classifier {
    /// Build from configuration. An empty API key means no oracle.
    pub fn new(config: &OracleConfig) -> Self {
        let oracle = if config.api_key.is_empty() {
            None
        } else {
            Some(OracleClient::new(config))
        };
        Self { oracle }
    }

    /// A classifier that only uses the keyword fallback.
    pub fn without_oracle() -> Self {
        Self { oracle: None }
    }

    /// Classify one message in its channel/sender context.
    ///
    /// Never errors: a failed oracle call is logged and degrades to the
    /// keyword fallback with a medium default, an unconfigured oracle
    /// to the same fallback with a low default.
    pub fn classify(&self, text: &str, channel_name: &str, sender_name: &str) -> Classification {
        if let Some(oracle) = &self.oracle {
            match oracle.classify(text, channel_name, sender_name) {
                Ok(mut verdict) => {
                    // The oracle's own flag is not trusted for this field:
                    // only an urgent verdict interrupts.
                    verdict.should_interrupt = verdict.urgency == UrgencyLevel::Urgent;
                    return verdict;
                }
                Err(e) => {
                    log::warn!("urgency oracle call failed, using keyword fallback: {e}");
                    return fallback(text, UrgencyLevel::Medium);
                }
            }
        }
        fallback(text, UrgencyLevel::Low)
    }
}

fn fallback(text: &str, default_level: UrgencyLevel) -> Classification {
    if contains_urgent_keyword(text) {
        return Classification {
            urgency: UrgencyLevel::Urgent,
            reason: "contains urgent keywords".to_string(),
            should_interrupt: true,
        };
    }
    let reason = match default_level {
        UrgencyLevel::Medium => "classifier unavailable".to_string(),
        _ => "no urgent keywords detected".to_string(),
    };
    Classification {
        urgency: default_level,
        reason,
        should_interrupt: false,
    }
}
