//! Slack message builders for the support-email flow.
//!
//! Provides:
//! - the support-form modal opened by the slash command
//! - the status texts posted back to the user

use super::types::{Block, ContextElement, InputElement, PlainText, View};

/// `callback_id` of the support-form modal.
pub const EMAIL_FORM_CALLBACK_ID: &str = "email_submission";

/// Block holding the contact address input.
pub const EMAIL_BLOCK_ID: &str = "email_block";
/// Contact address input.
pub const EMAIL_ACTION_ID: &str = "email_input";

/// Block holding the message input.
pub const MESSAGE_BLOCK_ID: &str = "message_block";
/// Message input.
pub const MESSAGE_ACTION_ID: &str = "message_input";

/// Prepended to a status text delivered through the fallback DM.
pub const FALLBACK_PREFIX: &str =
    "I couldn't reply in the original conversation, so here is your update:";

/// Build the support-form modal.
///
/// The modal contains:
/// - Context line naming the greeting and who receives the message
/// - Contact address input
/// - Multiline message input
#[must_use]
pub fn build_email_form(sender_name: &str, support_address: &str) -> View {
    View {
        view_type: "modal",
        callback_id: EMAIL_FORM_CALLBACK_ID.to_string(),
        title: PlainText::new("Send an Email"),
        submit: PlainText::new("Send"),
        close: PlainText::new("Cancel"),
        blocks: vec![
            Block::Context {
                elements: vec![ContextElement::Mrkdwn {
                    text: format!(
                        "Hi {sender_name}! Your message will be emailed to *{support_address}*."
                    ),
                }],
            },
            Block::Input {
                block_id: EMAIL_BLOCK_ID.to_string(),
                label: PlainText::new("Enter your Email"),
                element: InputElement::PlainTextInput {
                    action_id: EMAIL_ACTION_ID.to_string(),
                    multiline: false,
                    placeholder: PlainText::new("you@example.com"),
                },
            },
            Block::Input {
                block_id: MESSAGE_BLOCK_ID.to_string(),
                label: PlainText::new("Enter Your Message"),
                element: InputElement::PlainTextInput {
                    action_id: MESSAGE_ACTION_ID.to_string(),
                    multiline: true,
                    placeholder: PlainText::new("Enter your message here"),
                },
            },
        ],
    }
}

/// Status after a support form was emailed.
#[must_use]
pub fn form_sent_text() -> String {
    "✅ Your email has been sent successfully!".to_string()
}

/// Status after a message was forwarded.
#[must_use]
pub fn forward_sent_text() -> String {
    "✅ This message has been forwarded to support by email.".to_string()
}

/// Status after delivery failed.
#[must_use]
pub fn delivery_failed_text(reason: &str) -> String {
    format!("❌ Failed to send email: {reason}")
}

/// Status when the contact address was rejected.
#[must_use]
pub fn invalid_address_text(command: &str) -> String {
    format!("❌ Invalid email format. Please try again with `{command}`.")
}

/// Status when the modal could not be opened.
#[must_use]
pub fn form_unavailable_text(command: &str) -> String {
    format!("❌ I couldn't open the email form. Please try `{command}` again.")
}

/// Wrap a status text for the fallback DM.
#[must_use]
pub fn fallback_text(status: &str) -> String {
    format!("{FALLBACK_PREFIX}\n{status}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_form_layout() {
        let view = serde_json::to_value(build_email_form("Jane", "support@example.org"))
            .expect("serialize");

        assert_eq!(view["type"], "modal");
        assert_eq!(view["callback_id"], EMAIL_FORM_CALLBACK_ID);
        assert_eq!(view["title"]["text"], "Send an Email");
        assert_eq!(view["submit"]["text"], "Send");

        let blocks = view["blocks"].as_array().expect("blocks");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0]["type"], "context");
        assert!(
            blocks[0]["elements"][0]["text"]
                .as_str()
                .is_some_and(|t| t.contains("support@example.org"))
        );
        assert_eq!(blocks[1]["block_id"], EMAIL_BLOCK_ID);
        assert_eq!(blocks[1]["element"]["action_id"], EMAIL_ACTION_ID);
        assert_eq!(blocks[2]["block_id"], MESSAGE_BLOCK_ID);
        assert_eq!(blocks[2]["element"]["multiline"], true);
    }

    #[test]
    fn test_status_texts() {
        assert_eq!(
            delivery_failed_text("connection refused"),
            "❌ Failed to send email: connection refused"
        );
        assert_eq!(
            invalid_address_text("/email"),
            "❌ Invalid email format. Please try again with `/email`."
        );
    }

    #[test]
    fn test_fallback_text_keeps_status() {
        let text = fallback_text(&form_sent_text());
        assert!(text.starts_with(FALLBACK_PREFIX));
        assert!(text.ends_with("✅ Your email has been sent successfully!"));
    }
}
