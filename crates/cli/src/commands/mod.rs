//! CLI command implementations.

pub mod config;
pub mod sign;

use slack_mailbridge::config::ConfigError;
use slack_mailbridge::slack::SlackError;
use slack_mailbridge_core::ComposeError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Signing failed.
    #[error(transparent)]
    Slack(#[from] SlackError),

    /// The test message was rejected before sending.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// The relay did not accept the test message.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}
