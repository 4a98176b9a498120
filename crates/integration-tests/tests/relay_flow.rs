//! Integration tests for the interaction handlers.
//!
//! These drive [`RelayService`] directly with in-memory Slack and mail fakes
//! and assert on what was emailed and where the user was notified.

use std::sync::Arc;

use serde_json::json;
use slack_mailbridge::services::{FeedbackOutcome, Outcome};
use slack_mailbridge::slack::messages::FALLBACK_PREFIX;
use slack_mailbridge::slack::{MessageShortcut, SlashCommand, ViewSubmission};
use slack_mailbridge_core::{DeliveryResult, MessageKind};
use slack_mailbridge_integration_tests::{FakeMailer, FakeSlack, SUPPORT_ADDRESS, relay};

fn submission(email: &str, message: &str) -> ViewSubmission {
    serde_json::from_value(json!({
        "type": "view_submission",
        "user": {"id": "U1", "username": "jdoe", "name": "jdoe"},
        "view": {
            "callback_id": "email_submission",
            "state": {"values": {
                "email_block": {"email_input": {"type": "plain_text_input", "value": email}},
                "message_block": {"message_input": {"type": "plain_text_input", "value": message}}
            }}
        }
    }))
    .expect("valid submission")
}

fn shortcut(channel_id: &str, channel_name: &str, text: &str) -> MessageShortcut {
    serde_json::from_value(json!({
        "type": "message_action",
        "callback_id": "forward_to_email",
        "user": {"id": "U1", "username": "jdoe", "name": "jdoe"},
        "channel": {"id": channel_id, "name": channel_name},
        "team": {"id": "T1", "domain": "acme"},
        "message": {"type": "message", "ts": "1712345678.000200", "text": text, "user": "U2"}
    }))
    .expect("valid shortcut")
}

fn slash_command() -> SlashCommand {
    serde_json::from_value(json!({
        "command": "/email",
        "text": "",
        "user_id": "U1",
        "user_name": "jdoe",
        "channel_id": "C1",
        "trigger_id": "13345224609.738474920.8088930838d88f008e0"
    }))
    .expect("valid command")
}

// =============================================================================
// Form submission
// =============================================================================

#[tokio::test]
async fn test_invalid_address_sends_no_mail() {
    let slack = Arc::new(FakeSlack::new().with_user("U1", "Jane Doe"));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = relay(&slack, &mailer)
        .handle_email_submission(&submission("not-an-email", "help"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::Relayed {
            delivery: None,
            ..
        }
    ));
    assert!(mailer.attempts().is_empty());

    let posts = slack.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "U1");
    assert_eq!(
        posts[0].text,
        "❌ Invalid email format. Please try again with `/email`."
    );
}

#[tokio::test]
async fn test_valid_submission_is_emailed_to_support() {
    let slack = Arc::new(FakeSlack::new().with_user("U1", "Jane Doe"));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = relay(&slack, &mailer)
        .handle_email_submission(&submission("jane@example.com", "help"))
        .await;

    assert_eq!(
        outcome,
        Outcome::Relayed {
            delivery: Some(DeliveryResult::Sent),
            feedback: FeedbackOutcome::Posted {
                channel: "U1".to_string(),
                via_fallback: false,
            },
        }
    );

    let attempts = mailer.attempts();
    assert_eq!(attempts.len(), 1);
    let message = &attempts[0];
    assert_eq!(message.kind(), MessageKind::FormSubmission);
    assert_eq!(message.subject(), "Support Request from Jane Doe");
    assert_eq!(message.destination(), SUPPORT_ADDRESS);
    assert_eq!(
        message.body(),
        "Message from Jane Doe (jane@example.com):\n\nhelp"
    );

    assert_eq!(
        slack.posts()[0].text,
        "✅ Your email has been sent successfully!"
    );
}

#[tokio::test]
async fn test_failed_delivery_reports_reason() {
    let slack = Arc::new(FakeSlack::new().with_user("U1", "Jane Doe"));
    let mailer = Arc::new(FakeMailer::failing("535 authentication failed"));

    let outcome = relay(&slack, &mailer)
        .handle_email_submission(&submission("jane@example.com", "help"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::Relayed {
            delivery: Some(DeliveryResult::Failed(_)),
            ..
        }
    ));
    assert_eq!(mailer.attempts().len(), 1);
    assert_eq!(
        slack.posts()[0].text,
        "❌ Failed to send email: 535 authentication failed"
    );
}

#[tokio::test]
async fn test_user_lookup_failure_uses_payload_name() {
    let slack = Arc::new(FakeSlack::new().failing_user_lookup());
    let mailer = Arc::new(FakeMailer::new());

    relay(&slack, &mailer)
        .handle_email_submission(&submission("jane@example.com", "help"))
        .await;

    assert_eq!(mailer.attempts()[0].subject(), "Support Request from jdoe");
}

#[tokio::test]
async fn test_submission_feedback_falls_back_to_dm() {
    let slack = Arc::new(
        FakeSlack::new()
            .with_user("U1", "Jane Doe")
            .failing_channel("U1"),
    );
    let mailer = Arc::new(FakeMailer::new());

    let outcome = relay(&slack, &mailer)
        .handle_email_submission(&submission("jane@example.com", "help"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::Relayed {
            feedback: FeedbackOutcome::Posted {
                via_fallback: true,
                ..
            },
            ..
        }
    ));
    assert_eq!(mailer.attempts().len(), 1);
}

// =============================================================================
// Message shortcut
// =============================================================================

#[tokio::test]
async fn test_forwarded_message_carries_provenance() {
    let slack = Arc::new(FakeSlack::new().with_user("U1", "Jane Doe"));
    let mailer = Arc::new(FakeMailer::new());

    relay(&slack, &mailer)
        .forward_message(&shortcut("C0G9QF9GW", "general", "hello"))
        .await;

    let attempts = mailer.attempts();
    assert_eq!(attempts.len(), 1);
    let message = &attempts[0];
    assert_eq!(message.kind(), MessageKind::ForwardedMessage);
    assert_eq!(message.subject(), "Forwarded Slack Message from Jane Doe");
    assert_eq!(message.destination(), SUPPORT_ADDRESS);
    assert!(message.body().contains("#general"));
    assert!(message.body().contains("hello"));
    assert!(
        message
            .body()
            .contains("https://acme.slack.com/archives/C0G9QF9GW/p1712345678000200")
    );

    let posts = slack.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "C0G9QF9GW");
    assert_eq!(posts[0].thread_ts.as_deref(), Some("1712345678.000200"));
    assert_eq!(
        posts[0].text,
        "✅ This message has been forwarded to support by email."
    );
}

#[tokio::test]
async fn test_forward_from_dm_is_not_threaded() {
    let slack = Arc::new(FakeSlack::new());
    let mailer = Arc::new(FakeMailer::new());

    relay(&slack, &mailer)
        .forward_message(&shortcut("D024BE91L", "directmessage", "hello"))
        .await;

    assert!(mailer.attempts()[0].body().contains("direct message"));

    let posts = slack.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "D024BE91L");
    assert!(posts[0].thread_ts.is_none());
}

#[tokio::test]
async fn test_failed_thread_reply_uses_exactly_one_fallback() {
    let slack = Arc::new(FakeSlack::new().failing_channel("C0G9QF9GW"));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = relay(&slack, &mailer)
        .forward_message(&shortcut("C0G9QF9GW", "general", "hello"))
        .await;

    assert_eq!(
        outcome,
        Outcome::Relayed {
            delivery: Some(DeliveryResult::Sent),
            feedback: FeedbackOutcome::Posted {
                channel: "DU1".to_string(),
                via_fallback: true,
            },
        }
    );

    let posts = slack.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].channel, "DU1");
    assert!(posts[1].text.starts_with(FALLBACK_PREFIX));
    assert!(posts[1].text.contains("forwarded to support"));
    assert_eq!(slack.opened_dms().len(), 1);
}

#[tokio::test]
async fn test_feedback_gives_up_after_fallback() {
    let slack = Arc::new(
        FakeSlack::new()
            .failing_channel("C0G9QF9GW")
            .failing_channel("DU1"),
    );
    let mailer = Arc::new(FakeMailer::new());

    let outcome = relay(&slack, &mailer)
        .forward_message(&shortcut("C0G9QF9GW", "general", "hello"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::Relayed {
            delivery: Some(DeliveryResult::Sent),
            feedback: FeedbackOutcome::PostFailed { .. },
        }
    ));
    assert_eq!(slack.posts().len(), 2);
}

// =============================================================================
// Slash command
// =============================================================================

#[tokio::test]
async fn test_slash_command_opens_form() {
    let slack = Arc::new(FakeSlack::new().with_user("U1", "Jane Doe"));
    let mailer = Arc::new(FakeMailer::new());

    let outcome = relay(&slack, &mailer).open_email_form(&slash_command()).await;

    assert_eq!(outcome, Outcome::FormOpened);
    let views = slack.views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].0, "13345224609.738474920.8088930838d88f008e0");
    assert_eq!(views[0].1.callback_id, "email_submission");
    assert!(slack.posts().is_empty());
    assert!(mailer.attempts().is_empty());
}

#[tokio::test]
async fn test_form_failure_is_reported_to_user() {
    let slack = Arc::new(FakeSlack::new().failing_views());
    let mailer = Arc::new(FakeMailer::new());

    let outcome = relay(&slack, &mailer).open_email_form(&slash_command()).await;

    assert!(matches!(outcome, Outcome::FormUnavailable { .. }));
    let posts = slack.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "U1");
    assert!(posts[0].text.contains("/email"));
}
