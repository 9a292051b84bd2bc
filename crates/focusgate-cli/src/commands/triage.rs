use chrono::Utc;
use focusgate_core::storage::{Config, Database};
use focusgate_core::{Classifier, Disposition, InboundMessage, TriagePipeline};

pub fn run(
    user: &str,
    channel: &str,
    sender: &str,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let config = Config::load()?;
    let db = Database::open()?;
    let classifier = Classifier::new(&config.oracle);
    let pipeline = TriagePipeline::new(&db, &classifier);

    let message = InboundMessage {
        channel_id: channel.to_string(),
        channel_name: channel.to_string(),
        sender_id: sender.to_string(),
        sender_name: sender.to_string(),
        text: text.to_string(),
        sent_at: Utc::now(),
    };

    match pipeline.triage(user, &message) {
        Disposition::NotInFocus => {
            println!("{user} is not in focus mode; message delivered normally.");
        }
        Disposition::PassedThrough(verdict) => {
            println!(
                "Passed through ({}, interrupts): {}",
                verdict.urgency.as_str(),
                verdict.reason
            );
        }
        Disposition::Held(verdict) => {
            println!("Held ({}): {}", verdict.urgency.as_str(), verdict.reason);
        }
    }
    Ok(())
}
