//! Outbound email message and its provenance.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::address::ContactAddress;
use super::ids::{ChannelId, MessageTs};

/// What kind of interaction produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Submitted through the support form modal.
    FormSubmission,
    /// Forwarded from an existing Slack message via a message shortcut.
    ForwardedMessage,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormSubmission => write!(f, "form_submission"),
            Self::ForwardedMessage => write!(f, "forwarded_message"),
        }
    }
}

/// Where a forwarded message was originally posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginLocation {
    /// A named (or at least identified) channel.
    Channel {
        /// Channel id.
        id: ChannelId,
        /// Channel name without the leading `#`, when Slack supplied one.
        name: Option<String>,
    },
    /// A direct-message conversation.
    DirectMessage,
}

impl fmt::Display for OriginLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel {
                name: Some(name), ..
            } => write!(f, "#{name}"),
            Self::Channel { id, name: None } => write!(f, "#{id}"),
            Self::DirectMessage => write!(f, "direct message"),
        }
    }
}

/// Provenance of a forwarded Slack message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOrigin {
    location: OriginLocation,
    permalink: String,
}

impl MessageOrigin {
    /// Build the origin for a message in `channel`.
    ///
    /// Slack reports DMs with the channel name `directmessage`; those and
    /// `D`-prefixed ids are treated as direct messages. The permalink is
    /// reconstructed from the workspace domain, falling back to the
    /// domain-less `slack.com` form.
    #[must_use]
    pub fn new(
        channel: &ChannelId,
        channel_name: Option<&str>,
        team_domain: Option<&str>,
        ts: &MessageTs,
    ) -> Self {
        let is_dm = channel.is_direct_message() || channel_name == Some("directmessage");

        let location = if is_dm {
            OriginLocation::DirectMessage
        } else {
            OriginLocation::Channel {
                id: channel.clone(),
                name: channel_name
                    .map(|n| n.trim_start_matches('#'))
                    .filter(|n| !n.is_empty())
                    .map(String::from),
            }
        };

        let host = match team_domain.filter(|d| !d.is_empty()) {
            Some(domain) => format!("{domain}.slack.com"),
            None => "slack.com".to_string(),
        };
        let permalink = format!(
            "https://{host}/archives/{channel}/{fragment}",
            fragment = ts.permalink_fragment()
        );

        Self {
            location,
            permalink,
        }
    }

    /// Where the message was posted.
    #[must_use]
    pub const fn location(&self) -> &OriginLocation {
        &self.location
    }

    /// Deep link back to the original message.
    #[must_use]
    pub fn permalink(&self) -> &str {
        &self.permalink
    }
}

/// A composed email, ready for the relay.
///
/// Only [`crate::Composer`] builds these, which is what guarantees the
/// destination is always the configured support address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub(crate) kind: MessageKind,
    pub(crate) sender_name: String,
    pub(crate) sender_address: Option<ContactAddress>,
    pub(crate) destination: String,
    pub(crate) subject: String,
    pub(crate) body: String,
}

impl OutboundMessage {
    /// Interaction kind this message came from.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Display name of the Slack user who sent it.
    #[must_use]
    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Address the user asked to be contacted at, if any.
    #[must_use]
    pub const fn sender_address(&self) -> Option<&ContactAddress> {
        self.sender_address.as_ref()
    }

    /// The support address.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Plain-text body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The relay accepted the message.
    Sent,
    /// Connecting, authenticating, or sending failed.
    Failed(String),
}

impl DeliveryResult {
    /// Whether the relay accepted the message.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_named_channel() {
        let origin = MessageOrigin::new(
            &ChannelId::new("C0G9QF9GW"),
            Some("general"),
            Some("acme"),
            &MessageTs::new("1712345678.000200"),
        );

        assert_eq!(origin.location().to_string(), "#general");
        assert_eq!(
            origin.permalink(),
            "https://acme.slack.com/archives/C0G9QF9GW/p1712345678000200"
        );
    }

    #[test]
    fn test_origin_direct_message() {
        let origin = MessageOrigin::new(
            &ChannelId::new("D0G9QF9GW"),
            Some("directmessage"),
            None,
            &MessageTs::new("1.2"),
        );

        assert_eq!(origin.location(), &OriginLocation::DirectMessage);
        assert_eq!(origin.location().to_string(), "direct message");
        assert_eq!(origin.permalink(), "https://slack.com/archives/D0G9QF9GW/p12");
    }

    #[test]
    fn test_origin_unnamed_channel_uses_id() {
        let origin = MessageOrigin::new(
            &ChannelId::new("C123"),
            None,
            Some("acme"),
            &MessageTs::new("1.2"),
        );
        assert_eq!(origin.location().to_string(), "#C123");
    }

    #[test]
    fn test_delivery_result() {
        assert!(DeliveryResult::Sent.is_sent());
        assert!(!DeliveryResult::Failed("boom".to_string()).is_sent());
    }
}
