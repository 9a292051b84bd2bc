//! # Focusgate Core Library
//!
//! Core business logic for Focusgate, a focus-mode assistant for team
//! chat: a slash command opens a bounded focus window, messages sent to
//! the user during the window are triaged by urgency, non-urgent ones
//! are held and delivered as one digest when the window closes, urgent
//! ones pass through immediately.
//!
//! ## Architecture
//!
//! - **Session Manager**: per-user state machine over the SQLite store;
//!   expiry is a read-time filter, not a background job
//! - **Triage Pipeline**: stateless hold-or-pass decision per inbound
//!   message, with an append-only audit log
//! - **Classifier**: language-model oracle with a keyword fallback;
//!   only an `urgent` verdict interrupts
//! - **Summary Composer**: channel-grouped digest of held messages,
//!   dispatched fire-and-forget over the DM capability
//! - **Command Surface**: subcommand routing with user-facing
//!   acknowledgments and a generic catch-all
//!
//! ## Key Components
//!
//! - [`SessionManager`]: start / end / query-active
//! - [`TriagePipeline`]: hold or pass one message
//! - [`Classifier`]: urgency verdicts
//! - [`CommandSurface`]: slash-command handling
//! - [`Database`]: session, held-item, and audit-log persistence

pub mod classify;
pub mod duration;
pub mod error;
pub mod session;
pub mod slack;
pub mod storage;
pub mod summary;
pub mod surface;
pub mod triage;

pub use classify::{Classification, Classifier, OracleClient, UrgencyLevel};
pub use duration::{format_duration, parse_duration};
pub use error::{ClassifyError, ConfigError, CoreError, DatabaseError};
pub use session::SessionManager;
pub use slack::{verify_signature, MessageEvent, SlackMessenger, SlashCommand};
pub use storage::{Config, Database, FocusSession, HeldItem, NotificationRecord};
pub use summary::{compose_summary, deliver_summary, dispatch_summary, Messenger};
pub use surface::{parse_command, CommandSurface, FocusCommand};
pub use triage::{Disposition, InboundMessage, TriagePipeline};
