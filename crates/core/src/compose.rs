//! Notification composer.
//!
//! Turns the fields extracted from a Slack interaction into an
//! [`OutboundMessage`] addressed to the support inbox.

use thiserror::Error;

use crate::types::{AddressError, ContactAddress, MessageKind, MessageOrigin, OutboundMessage};

/// Errors that stop a message from being composed.
///
/// These are user-correctable: the handler reports them back to the user
/// instead of attempting delivery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// The contact address on a form submission is missing or malformed.
    #[error("invalid contact address: {0}")]
    InvalidAddress(#[from] AddressError),
}

/// The interaction a message is composed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Support form submitted from the modal.
    FormSubmission,
    /// Existing Slack message forwarded via the message shortcut.
    ForwardedMessage(MessageOrigin),
}

impl Interaction {
    const fn kind(&self) -> MessageKind {
        match self {
            Self::FormSubmission => MessageKind::FormSubmission,
            Self::ForwardedMessage(_) => MessageKind::ForwardedMessage,
        }
    }
}

/// Builds outbound messages for a single, fixed support address.
#[derive(Debug, Clone)]
pub struct Composer {
    support_address: String,
}

impl Composer {
    /// Create a composer that addresses every message to `support_address`.
    #[must_use]
    pub fn new(support_address: impl Into<String>) -> Self {
        Self {
            support_address: support_address.into(),
        }
    }

    /// The configured destination.
    #[must_use]
    pub fn support_address(&self) -> &str {
        &self.support_address
    }

    /// Compose a message.
    ///
    /// Form submissions require a contact address containing `@`. Forwarded
    /// messages ignore the contact address requirement and get a provenance
    /// header (origin location and permalink) in front of the text.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidAddress`] for a form submission whose
    /// contact address is missing or has no `@`.
    pub fn compose(
        &self,
        sender_name: &str,
        contact: Option<&str>,
        text: &str,
        interaction: &Interaction,
    ) -> Result<OutboundMessage, ComposeError> {
        let (sender_address, subject, body) = match interaction {
            Interaction::FormSubmission => {
                let address = ContactAddress::parse(contact.unwrap_or_default())?;
                let body = format!("Message from {sender_name} ({address}):\n\n{text}");
                (
                    Some(address),
                    format!("Support Request from {sender_name}"),
                    body,
                )
            }
            Interaction::ForwardedMessage(origin) => {
                let body = format!(
                    "Forwarded by {sender_name} from {location}\nOriginal message: {link}\n\n{text}",
                    location = origin.location(),
                    link = origin.permalink(),
                );
                // An address is optional here; keep it only when it is usable.
                let address = contact.and_then(|c| ContactAddress::parse(c).ok());
                (
                    address,
                    format!("Forwarded Slack Message from {sender_name}"),
                    body,
                )
            }
        };

        Ok(OutboundMessage {
            kind: interaction.kind(),
            sender_name: sender_name.to_owned(),
            sender_address,
            destination: self.support_address.clone(),
            subject,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelId, MessageTs};

    fn composer() -> Composer {
        Composer::new("support@example.org")
    }

    #[test]
    fn test_form_submission() {
        let message = composer()
            .compose(
                "Jane Doe",
                Some("jane@example.com"),
                "help",
                &Interaction::FormSubmission,
            )
            .expect("valid submission");

        assert_eq!(message.subject(), "Support Request from Jane Doe");
        assert_eq!(message.destination(), "support@example.org");
        assert_eq!(message.kind(), MessageKind::FormSubmission);
        assert_eq!(
            message.body(),
            "Message from Jane Doe (jane@example.com):\n\nhelp"
        );
        assert_eq!(
            message.sender_address().map(ContactAddress::as_str),
            Some("jane@example.com")
        );
    }

    #[test]
    fn test_form_submission_invalid_address() {
        let result = composer().compose(
            "Jane Doe",
            Some("not-an-email"),
            "help",
            &Interaction::FormSubmission,
        );

        assert_eq!(
            result,
            Err(ComposeError::InvalidAddress(AddressError::MissingAtSymbol))
        );
    }

    #[test]
    fn test_form_submission_missing_address() {
        let result = composer().compose("Jane Doe", None, "help", &Interaction::FormSubmission);
        assert_eq!(
            result,
            Err(ComposeError::InvalidAddress(AddressError::Empty))
        );
    }

    #[test]
    fn test_forwarded_message() {
        let origin = MessageOrigin::new(
            &ChannelId::new("C024BE91L"),
            Some("general"),
            Some("acme"),
            &MessageTs::new("1712345678.000200"),
        );

        let message = composer()
            .compose(
                "Jane Doe",
                None,
                "hello",
                &Interaction::ForwardedMessage(origin),
            )
            .expect("forwarded messages need no address");

        assert_eq!(message.subject(), "Forwarded Slack Message from Jane Doe");
        assert_eq!(message.destination(), "support@example.org");
        assert!(message.sender_address().is_none());
        assert!(message.body().contains("#general"));
        assert!(message.body().contains("hello"));
        assert!(
            message
                .body()
                .contains("https://acme.slack.com/archives/C024BE91L/p1712345678000200")
        );
        assert!(message.body().ends_with("hello"));
    }

    #[test]
    fn test_forwarded_message_from_dm() {
        let origin = MessageOrigin::new(
            &ChannelId::new("D024BE91L"),
            Some("directmessage"),
            Some("acme"),
            &MessageTs::new("1.2"),
        );

        let message = composer()
            .compose("Jane Doe", None, "hi", &Interaction::ForwardedMessage(origin))
            .expect("forwarded");

        assert!(message.body().contains("from direct message"));
    }
}
