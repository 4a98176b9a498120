//! Interaction handlers.
//!
//! Runs after the webhook has been acknowledged: opens the support form,
//! relays form submissions and forwarded messages by email, and reports the
//! result back to the user. Nothing in here returns an error to the HTTP
//! layer; every failure ends up as a chat message or a log line.

use std::sync::Arc;

use slack_mailbridge_core::{
    Composer, DeliveryResult, Interaction, MessageKind, MessageOrigin, OutboundMessage, UserId,
};
use tracing::{info, instrument, warn};

use super::email::Mailer;
use super::feedback::{FeedbackOutcome, FeedbackReporter, FeedbackTarget};
use crate::router::Dispatch;
use crate::slack::messages::{
    EMAIL_ACTION_ID, EMAIL_BLOCK_ID, MESSAGE_ACTION_ID, MESSAGE_BLOCK_ID, build_email_form,
    delivery_failed_text, form_sent_text, form_unavailable_text, forward_sent_text,
    invalid_address_text,
};
use crate::slack::{MessageShortcut, SlackApi, SlashCommand, ViewSubmission};

/// What a handler did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The support form was opened.
    FormOpened,
    /// The form could not be opened; the user was told.
    FormUnavailable {
        reason: String,
        feedback: FeedbackOutcome,
    },
    /// A submission or forward was processed.
    Relayed {
        /// `None` when the input was rejected before any delivery attempt.
        delivery: Option<DeliveryResult>,
        feedback: FeedbackOutcome,
    },
}

/// Handles acknowledged interactions.
#[derive(Clone)]
pub struct RelayService {
    slack: Arc<dyn SlackApi>,
    mailer: Arc<dyn Mailer>,
    composer: Composer,
    feedback: FeedbackReporter,
    command: String,
}

impl std::fmt::Debug for RelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayService")
            .field("support_address", &self.composer.support_address())
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl RelayService {
    /// Create the service.
    ///
    /// `command` is the slash command named in user-facing hints.
    #[must_use]
    pub fn new(
        slack: Arc<dyn SlackApi>,
        mailer: Arc<dyn Mailer>,
        composer: Composer,
        command: impl Into<String>,
    ) -> Self {
        Self {
            feedback: FeedbackReporter::new(Arc::clone(&slack)),
            slack,
            mailer,
            composer,
            command: command.into(),
        }
    }

    /// Process a routed interaction.
    pub async fn handle(&self, dispatch: Dispatch) -> Outcome {
        match dispatch {
            Dispatch::SlashCommand(command) => self.open_email_form(&command).await,
            Dispatch::ViewSubmission(submission) => {
                self.handle_email_submission(&submission).await
            }
            Dispatch::MessageShortcut(shortcut) => self.forward_message(&shortcut).await,
        }
    }

    /// Open the support form for a slash command.
    #[instrument(skip(self, command), fields(user = %command.user_id))]
    pub async fn open_email_form(&self, command: &SlashCommand) -> Outcome {
        let name = self
            .sender_name(&command.user_id, command.user_name.as_deref())
            .await;
        let view = build_email_form(&name, self.composer.support_address());

        match self.slack.open_view(&command.trigger_id, &view).await {
            Ok(()) => Outcome::FormOpened,
            Err(e) => {
                warn!(error = %e, "Could not open the email form");
                let target = FeedbackTarget::UserChannel {
                    user: command.user_id.clone(),
                };
                let feedback = self
                    .feedback
                    .report(
                        &command.user_id,
                        &target,
                        &form_unavailable_text(&self.command),
                    )
                    .await;
                Outcome::FormUnavailable {
                    reason: e.to_string(),
                    feedback,
                }
            }
        }
    }

    /// Email a submitted support form.
    #[instrument(skip(self, submission), fields(user = %submission.user.id))]
    pub async fn handle_email_submission(&self, submission: &ViewSubmission) -> Outcome {
        let user = &submission.user;
        let contact = submission.input_value(EMAIL_BLOCK_ID, EMAIL_ACTION_ID);
        let text = submission
            .input_value(MESSAGE_BLOCK_ID, MESSAGE_ACTION_ID)
            .unwrap_or_default();

        let name = self.sender_name(&user.id, Some(user.handle())).await;
        let target = FeedbackTarget::UserChannel {
            user: user.id.clone(),
        };

        match self
            .composer
            .compose(&name, contact, text, &Interaction::FormSubmission)
        {
            Ok(message) => self.deliver_and_report(&user.id, &target, &message).await,
            Err(e) => {
                info!(error = %e, "Rejected form submission");
                let feedback = self
                    .feedback
                    .report(&user.id, &target, &invalid_address_text(&self.command))
                    .await;
                Outcome::Relayed {
                    delivery: None,
                    feedback,
                }
            }
        }
    }

    /// Email a message picked with the message shortcut.
    #[instrument(
        skip(self, shortcut),
        fields(user = %shortcut.user.id, channel = %shortcut.channel.id)
    )]
    pub async fn forward_message(&self, shortcut: &MessageShortcut) -> Outcome {
        let user = &shortcut.user;
        let channel = &shortcut.channel;
        let ts = &shortcut.message.ts;
        let text = shortcut.message.text.as_deref().unwrap_or_default();

        let origin = MessageOrigin::new(
            &channel.id,
            channel.name.as_deref(),
            shortcut.team.as_ref().and_then(|t| t.domain.as_deref()),
            ts,
        );
        let target = FeedbackTarget::for_message(&origin, &channel.id, ts);

        let name = self.sender_name(&user.id, Some(user.handle())).await;

        match self
            .composer
            .compose(&name, None, text, &Interaction::ForwardedMessage(origin))
        {
            Ok(message) => self.deliver_and_report(&user.id, &target, &message).await,
            Err(e) => {
                // Forwarded messages carry no required address.
                warn!(error = %e, "Could not compose forwarded message");
                let feedback = self
                    .feedback
                    .report(&user.id, &target, &delivery_failed_text(&e.to_string()))
                    .await;
                Outcome::Relayed {
                    delivery: None,
                    feedback,
                }
            }
        }
    }

    async fn deliver_and_report(
        &self,
        user: &UserId,
        target: &FeedbackTarget,
        message: &OutboundMessage,
    ) -> Outcome {
        let delivery = self.mailer.deliver(message).await;

        let status = match (&delivery, message.kind()) {
            (DeliveryResult::Sent, MessageKind::FormSubmission) => form_sent_text(),
            (DeliveryResult::Sent, MessageKind::ForwardedMessage) => forward_sent_text(),
            (DeliveryResult::Failed(reason), _) => delivery_failed_text(reason),
        };

        let feedback = self.feedback.report(user, target, &status).await;
        Outcome::Relayed {
            delivery: Some(delivery),
            feedback,
        }
    }

    /// Display name for the email: the Slack profile name, else `fallback`,
    /// else the user id.
    async fn sender_name(&self, user: &UserId, fallback: Option<&str>) -> String {
        match self.slack.user_info(user).await {
            Ok(profile) => {
                if let Some(name) = profile.display_name() {
                    return name.trim().to_string();
                }
            }
            Err(e) => warn!(error = %e, "User lookup failed, using payload name"),
        }

        fallback
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| user.as_str())
            .to_string()
    }
}
