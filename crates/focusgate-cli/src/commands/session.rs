use std::sync::Arc;

use clap::Subcommand;
use focusgate_core::storage::{Config, Database};
use focusgate_core::{CommandSurface, Messenger, SlashCommand};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a focus session
    On {
        /// Duration like "2h", "30m", "1h30m" (default from config)
        duration: Option<String>,
    },
    /// End the session and print the held-message summary
    Off,
    /// Show remaining time
    Status,
}

/// Prints summaries to stdout instead of DMing them.
struct StdoutMessenger;

impl Messenger for StdoutMessenger {
    fn send_dm(&self, _user_id: &str, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        println!("{text}");
        Ok(())
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let config = Config::load()?;
    let db = Database::open()?;
    let user_id = std::env::var("FOCUSGATE_USER").unwrap_or_else(|_| "local".to_string());

    let text = match action {
        SessionAction::On { duration } => match duration {
            Some(d) => format!("on {d}"),
            None => "on".to_string(),
        },
        SessionAction::Off => "off".to_string(),
        SessionAction::Status => "status".to_string(),
    };

    let surface = CommandSurface::with_policy(&db, Arc::new(StdoutMessenger), &config.session);
    let response = surface.handle(&SlashCommand {
        user_id,
        text,
        ..Default::default()
    });
    println!("{response}");
    Ok(())
    // rt drops here and waits for any pending summary print
}
