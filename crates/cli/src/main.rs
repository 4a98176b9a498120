//! Slack Mail Bridge CLI - operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Print Slack signature headers for a request body
//! mailbridge-cli sign --body 'command=%2Femail&user_id=U1&trigger_id=1'
//!
//! # Load and summarize configuration
//! mailbridge-cli check-config
//!
//! # Send a test email through the relay
//! mailbridge-cli send-test --name "Ops" --message "Relay check"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mailbridge-cli")]
#[command(author, version, about = "Slack mail bridge operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print Slack signature headers for a request body
    Sign {
        /// Raw request body
        #[arg(short, long)]
        body: String,

        /// Unix timestamp to sign with (default: now)
        #[arg(short, long)]
        timestamp: Option<i64>,
    },
    /// Load configuration and print a redacted summary
    CheckConfig,
    /// Send a test support email through the configured relay
    SendTest {
        /// Sender display name
        #[arg(short, long, default_value = "Mail Bridge CLI")]
        name: String,

        /// Message body
        #[arg(short, long, default_value = "Test message from mailbridge-cli.")]
        message: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Sign { body, timestamp } => commands::sign::run(&body, timestamp)?,
        Commands::CheckConfig => commands::config::run()?,
        Commands::SendTest { name, message } => {
            commands::send_test::run(&name, &message).await?;
        }
    }
    Ok(())
}
