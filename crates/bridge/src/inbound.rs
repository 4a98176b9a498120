//! Inbound webhook requests.

use axum::body::Bytes;
use axum::http::{HeaderMap, header::CONTENT_TYPE};
use serde_json::{Map, Value};

/// Declared body encoding of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/x-www-form-urlencoded` (slash commands, interactivity).
    Form,
    /// `application/json` (Events API, URL verification).
    Json,
    /// Anything else, including a missing header.
    Unsupported(String),
}

impl ContentKind {
    /// Classify a `Content-Type` header value. Parameters are ignored.
    #[must_use]
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Unsupported(String::new());
        };

        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/x-www-form-urlencoded" => Self::Form,
            "application/json" => Self::Json,
            _ => Self::Unsupported(value.to_string()),
        }
    }
}

/// A webhook request exactly as received. Never modified after construction.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    headers: HeaderMap,
    body: Bytes,
    content_kind: ContentKind,
}

impl InboundRequest {
    /// Wrap raw headers and body.
    #[must_use]
    pub fn new(headers: HeaderMap, body: Bytes) -> Self {
        let content_kind =
            ContentKind::from_header(headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()));
        Self {
            headers,
            body,
            content_kind,
        }
    }

    /// Header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Declared content kind.
    #[must_use]
    pub const fn content_kind(&self) -> &ContentKind {
        &self.content_kind
    }
}

/// A parsed payload from a request that passed signature verification.
///
/// Only the router builds these, and only after verification succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedEvent {
    payload: Value,
    verified: bool,
}

impl VerifiedEvent {
    pub(crate) const fn new(payload: Value) -> Self {
        Self {
            payload,
            verified: true,
        }
    }

    /// The parsed payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Always `true`; kept on the value so downstream code can assert it.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    /// URL verification token, if this is a handshake.
    #[must_use]
    pub fn challenge(&self) -> Option<&str> {
        self.payload.get("challenge").and_then(Value::as_str)
    }
}

/// Body that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// JSON body or embedded `payload` field is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Form body is not valid UTF-8.
    #[error("form body is not valid UTF-8")]
    Encoding,
    /// Content type the bridge does not accept.
    #[error("unsupported content type: {0}")]
    Unsupported(String),
}

/// Decode a body into a JSON value.
///
/// Form bodies become an object of string fields; the interactivity
/// `payload` field, which carries JSON, is expanded in place.
///
/// # Errors
///
/// Returns error if the body cannot be decoded for its content kind.
pub fn parse_payload(kind: &ContentKind, body: &[u8]) -> Result<Value, PayloadError> {
    match kind {
        ContentKind::Json => Ok(serde_json::from_slice(body)?),
        ContentKind::Unsupported(raw) => Err(PayloadError::Unsupported(raw.clone())),
        ContentKind::Form => {
            std::str::from_utf8(body).map_err(|_| PayloadError::Encoding)?;

            let mut fields = Map::new();
            for (key, value) in url::form_urlencoded::parse(body) {
                let value = if key == "payload" {
                    serde_json::from_str(&value)?
                } else {
                    Value::String(value.into_owned())
                };
                fields.insert(key.into_owned(), value);
            }
            Ok(Value::Object(fields))
        }
    }
}
