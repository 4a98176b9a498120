//! Event router.
//!
//! Classifies a verified webhook request into what the HTTP layer should do
//! with it: echo a URL-verification challenge, acknowledge and dispatch an
//! interaction, or acknowledge and ignore it.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::inbound::{ContentKind, InboundRequest, VerifiedEvent, parse_payload};
use crate::slack::messages::EMAIL_FORM_CALLBACK_ID;
use crate::slack::{MessageShortcut, RejectReason, SlashCommand, Verification, ViewSubmission};

/// Interaction to process after the acknowledgement.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// The configured slash command: open the support form.
    SlashCommand(SlashCommand),
    /// The support form was submitted.
    ViewSubmission(Box<ViewSubmission>),
    /// A message shortcut was invoked: forward the message.
    MessageShortcut(Box<MessageShortcut>),
}

impl Dispatch {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SlashCommand(_) => "slash_command",
            Self::ViewSubmission(_) => "view_submission",
            Self::MessageShortcut(_) => "message_action",
        }
    }
}

/// Routing decision for a verified request.
#[derive(Debug, Clone)]
pub enum Route {
    /// URL verification handshake: echo the token.
    Challenge(String),
    /// Acknowledge, then process.
    Dispatch(Dispatch),
    /// Acknowledge and do nothing (events and interactions this bridge does not handle).
    Ignored(String),
}

/// Requests the router refuses.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Signature verification failed.
    #[error("request verification failed: {0}")]
    Unauthorized(RejectReason),

    /// Neither form-encoded nor JSON.
    #[error("unsupported content type: {0}")]
    UnsupportedMediaType(String),

    /// Body or payload could not be decoded.
    #[error("malformed request: {0}")]
    Malformed(String),
}

/// Route a request.
///
/// `slash_command` is the command this deployment answers (e.g. `/email`).
///
/// # Errors
///
/// Returns [`RouteError::Unauthorized`] for unverified requests,
/// [`RouteError::UnsupportedMediaType`] for other content types, and
/// [`RouteError::Malformed`] for undecodable bodies.
pub fn route(
    verification: &Verification,
    request: &InboundRequest,
    slash_command: &str,
) -> Result<Route, RouteError> {
    if let Verification::Rejected(reason) = verification {
        return Err(RouteError::Unauthorized(reason.clone()));
    }

    if let ContentKind::Unsupported(raw) = request.content_kind() {
        return Err(RouteError::UnsupportedMediaType(raw.clone()));
    }

    let payload = parse_payload(request.content_kind(), request.body())
        .map_err(|e| RouteError::Malformed(e.to_string()))?;

    classify(&VerifiedEvent::new(payload), slash_command)
}

/// Classify a verified event.
///
/// The challenge check comes first so a handshake is answered no matter what
/// else the payload carries.
///
/// # Errors
///
/// Returns [`RouteError::Malformed`] when a recognised interaction is
/// missing required fields.
pub fn classify(event: &VerifiedEvent, slash_command: &str) -> Result<Route, RouteError> {
    if let Some(token) = event.challenge() {
        return Ok(Route::Challenge(token.to_string()));
    }

    let payload = event.payload();

    if let Some(command) = payload.get("command").and_then(Value::as_str) {
        if command != slash_command {
            debug!(command, "Ignoring unknown slash command");
            return Ok(Route::Ignored(format!("command {command}")));
        }
        let command: SlashCommand = decode(payload)?;
        return Ok(Route::Dispatch(Dispatch::SlashCommand(command)));
    }

    if let Some(interaction) = payload.get("payload") {
        let interaction_type = interaction
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();

        return match interaction_type {
            "view_submission" => {
                let submission: ViewSubmission = decode(interaction)?;
                if submission.view.callback_id.as_deref() == Some(EMAIL_FORM_CALLBACK_ID) {
                    Ok(Route::Dispatch(Dispatch::ViewSubmission(Box::new(
                        submission,
                    ))))
                } else {
                    Ok(Route::Ignored("view_submission".to_string()))
                }
            }
            "message_action" => {
                let shortcut: MessageShortcut = decode(interaction)?;
                Ok(Route::Dispatch(Dispatch::MessageShortcut(Box::new(
                    shortcut,
                ))))
            }
            other => {
                debug!(interaction_type = other, "Ignoring unhandled interaction type");
                Ok(Route::Ignored(other.to_string()))
            }
        };
    }

    let event_type = payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    debug!(event_type, "Ignoring unhandled event");
    Ok(Route::Ignored(event_type.to_string()))
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, RouteError> {
    T::deserialize(value).map_err(|e| RouteError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, header::CONTENT_TYPE};
    use serde_json::json;

    fn request(content_type: &str, body: &str) -> InboundRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type.parse().expect("header"));
        InboundRequest::new(headers, Bytes::from(body.to_owned()))
    }

    fn form_with_payload(payload: &Value) -> InboundRequest {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("payload", &payload.to_string())
            .finish();
        request("application/x-www-form-urlencoded", &body)
    }

    #[test]
    fn test_rejected_requests_never_route() {
        let result = route(
            &Verification::Rejected(RejectReason::Mismatch),
            &request("application/json", r#"{"challenge":"abc"}"#),
            "/email",
        );
        assert!(matches!(result, Err(RouteError::Unauthorized(_))));
    }

    #[test]
    fn test_unsupported_content_type() {
        let result = route(
            &Verification::Verified,
            &request("text/plain", "hello"),
            "/email",
        );
        assert!(matches!(result, Err(RouteError::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_challenge_wins_over_everything() {
        let event = VerifiedEvent::new(json!({
            "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P",
            "type": "url_verification",
            "command": "/email",
        }));

        match classify(&event, "/email").expect("routes") {
            Route::Challenge(token) => {
                assert_eq!(token, "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P");
            }
            other => panic!("expected challenge, got {other:?}"),
        }
    }

    #[test]
    fn test_slash_command() {
        let route = route(
            &Verification::Verified,
            &request(
                "application/x-www-form-urlencoded",
                "command=%2Femail&user_id=U1&trigger_id=123.456&channel_id=C1",
            ),
            "/email",
        )
        .expect("routes");

        match route {
            Route::Dispatch(Dispatch::SlashCommand(command)) => {
                assert_eq!(command.user_id.as_str(), "U1");
                assert_eq!(command.trigger_id, "123.456");
            }
            other => panic!("expected slash command, got {other:?}"),
        }
    }

    #[test]
    fn test_other_slash_command_ignored() {
        let route = route(
            &Verification::Verified,
            &request(
                "application/x-www-form-urlencoded",
                "command=%2Fweather&user_id=U1&trigger_id=1",
            ),
            "/email",
        )
        .expect("routes");
        assert!(matches!(route, Route::Ignored(_)));
    }

    #[test]
    fn test_slash_command_missing_trigger_is_malformed() {
        let result = route(
            &Verification::Verified,
            &request("application/x-www-form-urlencoded", "command=%2Femail&user_id=U1"),
            "/email",
        );
        assert!(matches!(result, Err(RouteError::Malformed(_))));
    }

    #[test]
    fn test_view_submission() {
        let payload = json!({
            "type": "view_submission",
            "user": {"id": "U1"},
            "view": {"callback_id": "email_submission", "state": {"values": {}}}
        });

        let route = route(&Verification::Verified, &form_with_payload(&payload), "/email")
            .expect("routes");
        assert!(matches!(route, Route::Dispatch(Dispatch::ViewSubmission(_))));
    }

    #[test]
    fn test_foreign_view_submission_ignored() {
        let payload = json!({
            "type": "view_submission",
            "user": {"id": "U1"},
            "view": {"callback_id": "something_else", "state": {"values": {}}}
        });

        let route = route(&Verification::Verified, &form_with_payload(&payload), "/email")
            .expect("routes");
        assert!(matches!(route, Route::Ignored(_)));
    }

    #[test]
    fn test_message_shortcut() {
        let payload = json!({
            "type": "message_action",
            "callback_id": "forward_to_email",
            "user": {"id": "U1", "name": "jane"},
            "channel": {"id": "C1", "name": "general"},
            "team": {"id": "T1", "domain": "acme"},
            "message": {"ts": "1712345678.000200", "text": "hello", "user": "U2"}
        });

        let route = route(&Verification::Verified, &form_with_payload(&payload), "/email")
            .expect("routes");
        match route {
            Route::Dispatch(Dispatch::MessageShortcut(shortcut)) => {
                assert_eq!(shortcut.message.text.as_deref(), Some("hello"));
                assert_eq!(shortcut.channel.name.as_deref(), Some("general"));
            }
            other => panic!("expected message shortcut, got {other:?}"),
        }
    }

    #[test]
    fn test_block_actions_ignored() {
        let payload = json!({"type": "block_actions", "user": {"id": "U1"}});
        let route = route(&Verification::Verified, &form_with_payload(&payload), "/email")
            .expect("routes");
        assert!(matches!(route, Route::Ignored(kind) if kind == "block_actions"));
    }

    #[test]
    fn test_json_event_callback_ignored() {
        let route = route(
            &Verification::Verified,
            &request("application/json", r#"{"type":"event_callback","event":{}}"#),
            "/email",
        )
        .expect("routes");
        assert!(matches!(route, Route::Ignored(kind) if kind == "event_callback"));
    }

    #[test]
    fn test_malformed_json() {
        let result = route(
            &Verification::Verified,
            &request("application/json", "{not json"),
            "/email",
        );
        assert!(matches!(result, Err(RouteError::Malformed(_))));
    }
}
