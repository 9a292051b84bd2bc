//! Slash-command routing for the focus command.
//!
//! Subcommands: `on [duration]`, `off`, `status`, `help`, and a bare
//! duration as shorthand for `on`. Anything unrecognized renders the
//! help text. Every path returns a short user-directed acknowledgment;
//! the catch-all in [`CommandSurface::handle`] is the last line of
//! defense and never leaks internal detail to the chat surface.

use std::sync::Arc;

use chrono::Utc;
use indoc::indoc;

use crate::duration::{format_duration, parse_duration};
use crate::error::CoreError;
use crate::session::SessionManager;
use crate::slack::SlashCommand;
use crate::storage::{Database, SessionConfig};
use crate::summary::{dispatch_summary, Messenger};

/// Session length when `on` is given without a duration.
pub const DEFAULT_SESSION_MS: i64 = 2 * 60 * 60_000;
/// Longest session a user may request.
pub const MAX_SESSION_MS: i64 = 8 * 60 * 60_000;

const HELP_TEXT: &str = indoc! {"
    *Focus mode* -- hold non-urgent messages while you work.
    \u{2022} `/focus on [duration]` -- start a session (default 2h, e.g. `45m`, `1h30m`)
    \u{2022} `/focus 2h` -- shorthand for `on 2h`
    \u{2022} `/focus off` -- end the session and get a summary of held messages
    \u{2022} `/focus status` -- time remaining in the current session
    Urgent messages always come through immediately.
"};

const GENERIC_ERROR: &str = "Something went wrong, please try again.";
const NOT_IN_FOCUS: &str = "You're not in focus mode right now.";

/// A parsed focus subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusCommand {
    On(Option<String>),
    Off,
    Status,
    Help,
}

/// Parse the free text after the slash command.
pub fn parse_command(text: &str) -> FocusCommand {
    let mut parts = text.trim().split_whitespace();
    match parts.next().map(str::to_lowercase).as_deref() {
        None | Some("help") => FocusCommand::Help,
        Some("on") => FocusCommand::On(parts.next().map(str::to_string)),
        Some("off") => FocusCommand::Off,
        Some("status") => FocusCommand::Status,
        Some(word) if parse_duration(word).is_some() => FocusCommand::On(Some(word.to_string())),
        Some(_) => FocusCommand::Help,
    }
}

/// Stateless handler for one slash-command invocation.
pub struct CommandSurface<'a> {
    db: &'a Database,
    messenger: Arc<dyn Messenger>,
    default_ms: i64,
    max_ms: i64,
}

impl<'a> CommandSurface<'a> {
    pub fn new(db: &'a Database, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            db,
            messenger,
            default_ms: DEFAULT_SESSION_MS,
            max_ms: MAX_SESSION_MS,
        }
    }

    /// Build with duration policy taken from configuration.
    pub fn with_policy(
        db: &'a Database,
        messenger: Arc<dyn Messenger>,
        session: &SessionConfig,
    ) -> Self {
        Self {
            db,
            messenger,
            default_ms: parse_duration(&session.default_duration).unwrap_or(DEFAULT_SESSION_MS),
            max_ms: parse_duration(&session.max_duration).unwrap_or(MAX_SESSION_MS),
        }
    }

    /// Handle one invocation. Always returns an acknowledgment text;
    /// internal errors collapse into a single generic response.
    pub fn handle(&self, command: &SlashCommand) -> String {
        match self.dispatch(command) {
            Ok(response) => response,
            Err(e) => {
                log::error!("command handling failed for {}: {e}", command.user_id);
                GENERIC_ERROR.to_string()
            }
        }
    }

    fn dispatch(&self, command: &SlashCommand) -> Result<String, CoreError> {
        let sessions = SessionManager::new(self.db);
        match parse_command(&command.text) {
            FocusCommand::Help => Ok(HELP_TEXT.to_string()),
            FocusCommand::Status => Ok(self.status(&sessions, &command.user_id)),
            FocusCommand::On(arg) => Ok(self.start(&sessions, &command.user_id, arg)),
            FocusCommand::Off => Ok(self.stop(&sessions, &command.user_id)),
        }
    }

    fn status(&self, sessions: &SessionManager, user_id: &str) -> String {
        match sessions.get_active(user_id) {
            Some(session) => format!(
                "\u{1F515} Focus mode is on -- {} remaining (until {}).",
                format_duration(session.remaining_ms(Utc::now())),
                session.end_time.format("%H:%M UTC"),
            ),
            None => NOT_IN_FOCUS.to_string(),
        }
    }

    fn start(&self, sessions: &SessionManager, user_id: &str, arg: Option<String>) -> String {
        if let Some(existing) = sessions.get_active(user_id) {
            return format!(
                "You're already in focus mode with {} remaining. Use `off` to end it early.",
                format_duration(existing.remaining_ms(Utc::now())),
            );
        }

        let duration_ms = match arg {
            None => self.default_ms,
            Some(text) => match parse_duration(&text) {
                Some(ms) => ms,
                None => {
                    return format!(
                        "I couldn't read `{text}` as a duration. Try something like `2h`, `30m`, or `1h30m`."
                    );
                }
            },
        };
        if duration_ms > self.max_ms {
            return format!(
                "Focus sessions are capped at {}. Try a shorter duration.",
                format_duration(self.max_ms),
            );
        }

        match sessions.start(user_id, duration_ms) {
            Ok((session, drained)) => {
                if !drained.is_empty() {
                    // A racing session slipped past the check above; its
                    // digest still goes out.
                    dispatch_summary(self.messenger.clone(), user_id.to_string(), drained);
                }
                format!(
                    "\u{1F515} Focus mode on for {}. I'll hold non-urgent messages and send a summary at {}.",
                    format_duration(duration_ms),
                    session.end_time.format("%H:%M UTC"),
                )
            }
            Err(e) => {
                log::error!("failed to start focus session for {user_id}: {e}");
                "Couldn't start focus mode, please try again.".to_string()
            }
        }
    }

    fn stop(&self, sessions: &SessionManager, user_id: &str) -> String {
        if sessions.get_active(user_id).is_none() {
            return NOT_IN_FOCUS.to_string();
        }
        match sessions.end(user_id) {
            Ok(items) => {
                let count = items.len();
                dispatch_summary(self.messenger.clone(), user_id.to_string(), items);
                if count == 0 {
                    "\u{1F514} Focus mode off. No messages were held -- you're all caught up!"
                        .to_string()
                } else {
                    format!(
                        "\u{1F514} Focus mode off. I held {count} message{} -- summary coming in a DM.",
                        if count == 1 { "" } else { "s" },
                    )
                }
            }
            Err(e) => {
                log::error!("failed to end focus session for {user_id}: {e}");
                "Couldn't end focus mode, please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Messenger for RecordingMessenger {
        fn send_dm(&self, user_id: &str, text: &str) -> Result<(), Box<dyn std::error::Error>> {
            self.sent
                .lock()
                .unwrap()
                .push((user_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn slash(user: &str, text: &str) -> SlashCommand {
        SlashCommand {
            user_id: user.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_subcommands() {
        assert_eq!(parse_command("on 2h"), FocusCommand::On(Some("2h".to_string())));
        assert_eq!(parse_command("on"), FocusCommand::On(None));
        assert_eq!(parse_command("off"), FocusCommand::Off);
        assert_eq!(parse_command("STATUS"), FocusCommand::Status);
        assert_eq!(parse_command(""), FocusCommand::Help);
        assert_eq!(parse_command("help"), FocusCommand::Help);
    }

    #[test]
    fn bare_duration_is_shorthand_for_on() {
        assert_eq!(parse_command("2h"), FocusCommand::On(Some("2h".to_string())));
        assert_eq!(parse_command(" 45m "), FocusCommand::On(Some("45m".to_string())));
    }

    #[test]
    fn unrecognized_text_renders_help() {
        assert_eq!(parse_command("frobnicate"), FocusCommand::Help);
        assert_eq!(parse_command("onn 2h"), FocusCommand::Help);
    }

    #[test]
    fn on_rejects_unparseable_and_oversized_durations() {
        let db = Database::open_memory().unwrap();
        let surface = CommandSurface::new(&db, Arc::new(RecordingMessenger::default()));

        let resp = surface.handle(&slash("U1", "on forever"));
        assert!(resp.contains("couldn't read `forever`"));

        let resp = surface.handle(&slash("U1", "on 9h"));
        assert!(resp.contains("capped at 8h"));

        // neither attempt created a session
        let sessions = SessionManager::new(&db);
        assert!(sessions.get_active("U1").is_none());
    }

    #[test]
    fn overflowing_duration_is_a_validation_message_not_a_fault() {
        let db = Database::open_memory().unwrap();
        let surface = CommandSurface::new(&db, Arc::new(RecordingMessenger::default()));

        // 18 digits: a valid i64 hour count whose ms conversion overflows
        let resp = surface.handle(&slash("U1", "on 999999999999999999h"));
        assert!(resp.contains("couldn't read"));

        // the bare-duration form routes to help instead of On
        assert_eq!(parse_command("999999999999999999h"), FocusCommand::Help);
    }

    #[test]
    fn on_while_active_reports_remaining_time() {
        let db = Database::open_memory().unwrap();
        let surface = CommandSurface::new(&db, Arc::new(RecordingMessenger::default()));

        let first = surface.handle(&slash("U1", "on 2h"));
        assert!(first.contains("Focus mode on for 2h"));

        let second = surface.handle(&slash("U1", "on 1h"));
        assert!(second.contains("already in focus mode"));
        assert!(second.contains("remaining"));
    }

    #[test]
    fn off_without_session_is_a_plain_message() {
        let db = Database::open_memory().unwrap();
        let surface = CommandSurface::new(&db, Arc::new(RecordingMessenger::default()));
        assert_eq!(surface.handle(&slash("U1", "off")), NOT_IN_FOCUS);
    }

    #[test]
    fn status_reflects_session_state() {
        let db = Database::open_memory().unwrap();
        let surface = CommandSurface::new(&db, Arc::new(RecordingMessenger::default()));
        assert_eq!(surface.handle(&slash("U1", "status")), NOT_IN_FOCUS);

        surface.handle(&slash("U1", "on 30m"));
        let resp = surface.handle(&slash("U1", "status"));
        assert!(resp.contains("remaining"));
    }

    #[test]
    fn off_sends_the_digest_and_reports_the_count() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let db = Database::open_memory().unwrap();
        let messenger = Arc::new(RecordingMessenger::default());
        {
            let _guard = rt.enter();
            let surface = CommandSurface::new(&db, messenger.clone());
            surface.handle(&slash("U1", "on 2h"));
            let resp = surface.handle(&slash("U1", "off"));
            assert!(resp.contains("No messages were held"));
        }
        drop(rt); // waits for the fire-and-forget dispatch
        let sent = messenger.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "U1");
        assert_eq!(sent[0].1, crate::summary::NO_MESSAGES_TEXT);
    }

    #[test]
    fn policy_can_tighten_the_cap() {
        let db = Database::open_memory().unwrap();
        let policy = SessionConfig {
            default_duration: "1h".to_string(),
            max_duration: "4h".to_string(),
        };
        let surface =
            CommandSurface::with_policy(&db, Arc::new(RecordingMessenger::default()), &policy);

        let resp = surface.handle(&slash("U1", "on 5h"));
        assert!(resp.contains("capped at 4h"));

        let resp = surface.handle(&slash("U1", "on"));
        assert!(resp.contains("Focus mode on for 1h"));
    }
}
