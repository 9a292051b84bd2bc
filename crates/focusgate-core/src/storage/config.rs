//! TOML-based service configuration.
//!
//! Stores:
//! - Slack credentials (bot token, request-signing secret)
//! - Urgency-oracle settings (endpoint, model, API key, timeout)
//! - Session policy knobs (default and maximum focus duration)
//!
//! Configuration is stored at `~/.config/focusgate/config.toml`. A
//! missing file yields the defaults; a missing oracle API key simply
//! means classification runs on the local keyword fallback.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Slack transport credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlackConfig {
    /// Bot token used for chat.postMessage (xoxb-...).
    #[serde(default)]
    pub bot_token: String,
    /// Signing secret for verifying inbound webhook requests.
    #[serde(default)]
    pub signing_secret: String,
}

/// Classification-oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// API key; empty means unconfigured (keyword fallback only).
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
    /// Request timeout; a hung oracle call is treated as a failed one.
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_oracle_endpoint(),
            model: default_oracle_model(),
            timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

/// Session policy knobs, as duration strings ("2h", "45m", "1h30m").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_duration")]
    pub default_duration: String,
    #[serde(default = "default_max_duration")]
    pub max_duration: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_duration: default_session_duration(),
            max_duration: default_max_duration(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Path of the configuration file.
    pub fn path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults if the file
    /// does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Write the configuration back to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        let raw =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }
}

fn default_oracle_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_oracle_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_oracle_timeout_secs() -> u64 {
    10
}

fn default_session_duration() -> String {
    "2h".to_string()
}

fn default_max_duration() -> String {
    "8h".to_string()
}
