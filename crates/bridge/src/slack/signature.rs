//! Slack request signature verification.
//!
//! Implements Slack's signing scheme:
//! <https://api.slack.com/authentication/verifying-requests-from-slack>
//!
//! The signature is `v0=` followed by the lowercase hex HMAC-SHA256 of
//! `v0:{timestamp}:{raw body}` keyed with the app's signing secret. Requests
//! whose timestamp is more than [`REPLAY_WINDOW_SECS`] away from local time
//! are rejected regardless of signature.

use core::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, instrument};

use super::error::SlackError;
use crate::inbound::InboundRequest;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed distance between the request timestamp and local time.
pub const REPLAY_WINDOW_SECS: i64 = 300;

/// Header carrying the request timestamp (unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Signature scheme version prefix.
const VERSION: &str = "v0";

/// Result of verifying a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Timestamp is fresh and the signature matches.
    Verified,
    /// The request must not be processed.
    Rejected(RejectReason),
}

impl Verification {
    /// Whether the request may be handed to the router.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No timestamp header.
    MissingTimestamp,
    /// Timestamp header is not an integer.
    InvalidTimestamp,
    /// Timestamp is outside the replay window.
    Expired {
        /// Absolute distance from local time, in seconds.
        skew_secs: i64,
    },
    /// No signature header.
    MissingSignature,
    /// Signature does not match the body.
    Mismatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTimestamp => write!(f, "missing request timestamp"),
            Self::InvalidTimestamp => write!(f, "invalid request timestamp"),
            Self::Expired { skew_secs } => {
                write!(f, "request timestamp is {skew_secs}s away from local time")
            }
            Self::MissingSignature => write!(f, "missing request signature"),
            Self::Mismatch => write!(f, "signature mismatch"),
        }
    }
}

/// Verifies inbound requests against the app's signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: SecretString,
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("signing_secret", &"[REDACTED]")
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier for the given signing secret.
    #[must_use]
    pub const fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }

    /// Compute the `X-Slack-Signature` value for a body sent at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns error if the HMAC cannot be keyed.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SlackError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|e| SlackError::Signing(e.to_string()))?;

        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);

        Ok(format!(
            "{VERSION}={}",
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    /// Verify a request against the current wall-clock time.
    #[must_use]
    pub fn verify(&self, request: &InboundRequest) -> Verification {
        self.verify_at(request, chrono::Utc::now().timestamp())
    }

    /// Verify a request as if the current unix time were `now`.
    #[must_use]
    pub fn verify_at(&self, request: &InboundRequest, now: i64) -> Verification {
        self.verify_parts(
            request.header(TIMESTAMP_HEADER),
            request.header(SIGNATURE_HEADER),
            request.body(),
            now,
        )
    }

    /// Verify raw header values and body as if the current unix time were `now`.
    #[instrument(skip(self, signature, body))]
    pub fn verify_parts(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Verification {
        let Some(timestamp) = timestamp else {
            return Verification::Rejected(RejectReason::MissingTimestamp);
        };

        let Ok(ts) = timestamp.trim().parse::<i64>() else {
            return Verification::Rejected(RejectReason::InvalidTimestamp);
        };

        let skew_secs = now.saturating_sub(ts).saturating_abs();
        if skew_secs > REPLAY_WINDOW_SECS {
            return Verification::Rejected(RejectReason::Expired { skew_secs });
        }

        let Some(signature) = signature else {
            return Verification::Rejected(RejectReason::MissingSignature);
        };

        let Ok(expected) = self.sign(timestamp, body) else {
            return Verification::Rejected(RejectReason::Mismatch);
        };

        if !constant_time_compare(expected.as_bytes(), signature.as_bytes()) {
            return Verification::Rejected(RejectReason::Mismatch);
        }

        debug!("Slack signature verified");
        Verification::Verified
    }
}

/// Constant-time byte comparison.
///
/// Inputs of different length are rejected up front; the length of a valid
/// signature is public. Equal-length inputs are always compared in full.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let (difference, _) = accumulate_difference(a, b);
    difference == 0
}

/// OR of every byte-wise XOR, with the number of byte pairs visited.
fn accumulate_difference(a: &[u8], b: &[u8]) -> (u8, usize) {
    a.iter()
        .zip(b.iter())
        .fold((0, 0), |(difference, visited), (x, y)| {
            (difference | (x ^ y), visited + 1)
        })
}
