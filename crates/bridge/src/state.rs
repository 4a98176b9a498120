//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use slack_mailbridge_core::Composer;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, info, warn};

use crate::config::BridgeConfig;
use crate::router::Dispatch;
use crate::services::{Mailer, RelayService, SmtpMailer};
use crate::slack::{REQUEST_TIMEOUT, SignatureVerifier, SlackApi, SlackClient, SlackError};

/// Slack calls an interaction can make besides delivery: the user lookup,
/// the preferred reply, opening the fallback DM and posting there.
const SLACK_CALLS_PER_INTERACTION: u32 = 4;

/// Application state shared across all handlers.
///
/// Built once at start-up. Acknowledged interactions run on tasks tracked
/// here so shutdown can wait for them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    verifier: SignatureVerifier,
    relay: RelayService,
    interactions: TaskTracker,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("relay", &self.inner.relay)
            .field("pending_interactions", &self.inner.interactions.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state around explicit Slack and mail collaborators.
    #[must_use]
    pub fn new(config: BridgeConfig, slack: Arc<dyn SlackApi>, mailer: Arc<dyn Mailer>) -> Self {
        let verifier = SignatureVerifier::new(config.slack.signing_secret.clone());
        let relay = RelayService::new(
            slack,
            mailer,
            Composer::new(config.email.support_address.clone()),
            config.slack.command.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                verifier,
                relay,
                interactions: TaskTracker::new(),
            }),
        }
    }

    /// Build state with the real Slack client and SMTP mailer.
    ///
    /// # Errors
    ///
    /// Returns error if the Slack HTTP client cannot be built.
    pub fn from_config(config: BridgeConfig) -> Result<Self, SlackError> {
        let slack = SlackClient::new(config.slack.bot_token.clone())?;
        let mailer = SmtpMailer::new(config.email.clone());
        Ok(Self::new(config, Arc::new(slack), Arc::new(mailer)))
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Webhook signature verifier.
    #[must_use]
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.inner.verifier
    }

    /// Run an acknowledged interaction on a tracked task.
    pub fn spawn_interaction(&self, dispatch: Dispatch) {
        let relay = self.inner.relay.clone();
        let kind = dispatch.kind();

        self.inner.interactions.spawn(
            async move {
                let outcome = relay.handle(dispatch).await;
                info!(kind, outcome = ?outcome, "Interaction processed");
            }
            .in_current_span(),
        );
    }

    /// Upper bound for one interaction to finish: every Slack call timing
    /// out plus the SMTP timeout.
    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        REQUEST_TIMEOUT * SLACK_CALLS_PER_INTERACTION + self.inner.config.email.smtp_timeout
    }

    /// Wait for running interactions, at most `timeout`.
    ///
    /// Returns `false` if some were still running when the timeout hit.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let tracker = &self.inner.interactions;
        tracker.close();

        if tracker.is_empty() {
            return true;
        }
        info!(pending = tracker.len(), "Waiting for acknowledged interactions");

        if tokio::time::timeout(timeout, tracker.wait()).await.is_ok() {
            info!("All acknowledged interactions finished");
            true
        } else {
            warn!(
                pending = tracker.len(),
                "Shutdown timeout hit with interactions still running"
            );
            false
        }
    }
}
