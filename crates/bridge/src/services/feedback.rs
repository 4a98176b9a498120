//! Feedback reporter: tells the user what happened to their message.
//!
//! The status is first posted where the interaction happened. If that fails,
//! the reporter opens a DM with the user and posts the status there with a
//! short explanation. There is never more than one fallback attempt.

use std::sync::Arc;

use slack_mailbridge_core::{ChannelId, MessageOrigin, MessageTs, OriginLocation, UserId};
use tracing::{info, instrument, warn};

use crate::slack::messages::fallback_text;
use crate::slack::{SlackApi, SlackError};

/// Where the status should go first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackTarget {
    /// Reply in the thread of the original message.
    Thread {
        channel: ChannelId,
        thread_ts: MessageTs,
    },
    /// Plain post into an existing DM conversation.
    DirectMessage { channel: ChannelId },
    /// Post addressed to the user id.
    UserChannel { user: UserId },
}

impl FeedbackTarget {
    /// Target for a message-scoped interaction: thread reply in channels,
    /// plain post in DMs.
    #[must_use]
    pub fn for_message(origin: &MessageOrigin, channel: &ChannelId, ts: &MessageTs) -> Self {
        match origin.location() {
            OriginLocation::DirectMessage => Self::DirectMessage {
                channel: channel.clone(),
            },
            OriginLocation::Channel { .. } => Self::Thread {
                channel: channel.clone(),
                thread_ts: ts.clone(),
            },
        }
    }

    fn channel(&self) -> &str {
        match self {
            Self::Thread { channel, .. } | Self::DirectMessage { channel } => channel.as_str(),
            Self::UserChannel { user } => user.as_str(),
        }
    }

    fn thread_ts(&self) -> Option<&MessageTs> {
        match self {
            Self::Thread { thread_ts, .. } => Some(thread_ts),
            Self::DirectMessage { .. } | Self::UserChannel { .. } => None,
        }
    }
}

/// Final result of reporting a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The status was posted.
    Posted {
        /// Channel (or user id) that received it.
        channel: String,
        /// Whether the fallback DM was used.
        via_fallback: bool,
    },
    /// Neither the preferred post nor the fallback worked.
    PostFailed { reason: String },
}

impl FeedbackOutcome {
    /// Whether the user saw the status.
    #[must_use]
    pub const fn is_posted(&self) -> bool {
        matches!(self, Self::Posted { .. })
    }
}

enum ReplyState {
    Preferred,
    Fallback { preferred_error: SlackError },
    Done(FeedbackOutcome),
}

/// Posts status messages back to Slack users.
#[derive(Clone)]
pub struct FeedbackReporter {
    slack: Arc<dyn SlackApi>,
}

impl std::fmt::Debug for FeedbackReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackReporter").finish_non_exhaustive()
    }
}

impl FeedbackReporter {
    /// Create a reporter posting through `slack`.
    #[must_use]
    pub fn new(slack: Arc<dyn SlackApi>) -> Self {
        Self { slack }
    }

    /// Report `status` to `user`, preferring `target`.
    #[instrument(skip(self, status), fields(user = %user, target = ?target))]
    pub async fn report(&self, user: &UserId, target: &FeedbackTarget, status: &str) -> FeedbackOutcome {
        let mut state = ReplyState::Preferred;

        loop {
            state = match state {
                ReplyState::Preferred => match self
                    .slack
                    .post_message(target.channel(), status, target.thread_ts())
                    .await
                {
                    Ok(_) => ReplyState::Done(FeedbackOutcome::Posted {
                        channel: target.channel().to_string(),
                        via_fallback: false,
                    }),
                    Err(preferred_error) => {
                        warn!(error = %preferred_error, "Preferred reply failed, falling back to DM");
                        ReplyState::Fallback { preferred_error }
                    }
                },
                ReplyState::Fallback { preferred_error } => {
                    ReplyState::Done(self.post_fallback(user, status, &preferred_error).await)
                }
                ReplyState::Done(outcome) => {
                    if outcome.is_posted() {
                        info!(outcome = ?outcome, "Status reported");
                    }
                    return outcome;
                }
            };
        }
    }

    async fn post_fallback(
        &self,
        user: &UserId,
        status: &str,
        preferred_error: &SlackError,
    ) -> FeedbackOutcome {
        let text = fallback_text(status);

        let result = match self.slack.open_direct_message(user).await {
            Ok(channel) => self
                .slack
                .post_message(channel.as_str(), &text, None)
                .await
                .map(|_| channel),
            Err(e) => Err(e),
        };

        match result {
            Ok(channel) => FeedbackOutcome::Posted {
                channel: channel.to_string(),
                via_fallback: true,
            },
            Err(fallback_error) => {
                warn!(error = %fallback_error, "Fallback DM failed; user was not notified");
                FeedbackOutcome::PostFailed {
                    reason: format!("{preferred_error}; fallback: {fallback_error}"),
                }
            }
        }
    }
}
