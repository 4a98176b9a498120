//! Check that the environment holds a usable configuration.
//!
//! Prints the loaded configuration with secrets redacted.

use slack_mailbridge::BridgeConfig;

use super::CommandError;

/// Load configuration and report on it.
///
/// # Errors
///
/// Returns error if configuration cannot be loaded.
pub fn run() -> Result<(), CommandError> {
    let config = BridgeConfig::from_env()?;

    tracing::info!("Configuration OK");
    tracing::info!("  Listen: {}", config.socket_addr());
    tracing::info!("  Command: {}", config.slack.command);
    tracing::info!(
        "  Relay: {}:{} (timeout {}s)",
        config.email.smtp_host,
        config.email.smtp_port,
        config.email.smtp_timeout.as_secs()
    );
    tracing::info!("  Sender: {}", config.email.sender_address);
    tracing::info!("  Support address: {}", config.email.support_address);
    tracing::info!(
        "  Sentry: {}",
        if config.sentry_dsn.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );

    config.warn_weak_secrets();

    tracing::debug!("{config:#?}");
    Ok(())
}
