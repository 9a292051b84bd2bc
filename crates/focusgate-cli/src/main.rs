use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "focusgate", version, about = "Focusgate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Classify a message's urgency
    Classify {
        /// Message text
        text: String,
        /// Channel name for context
        #[arg(long, default_value = "general")]
        channel: String,
        /// Sender name for context
        #[arg(long, default_value = "someone")]
        sender: String,
    },
    /// Run one message through the triage pipeline
    Triage {
        /// Recipient user id
        #[arg(long)]
        user: String,
        /// Source channel name
        #[arg(long, default_value = "general")]
        channel: String,
        /// Sender name
        #[arg(long, default_value = "someone")]
        sender: String,
        /// Message text
        text: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Classify {
            text,
            channel,
            sender,
        } => commands::classify::run(&text, &channel, &sender),
        Commands::Triage {
            user,
            channel,
            sender,
            text,
        } => commands::triage::run(&user, &channel, &sender, &text),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
