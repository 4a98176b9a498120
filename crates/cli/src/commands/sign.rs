//! Sign a request body the way Slack does.
//!
//! Useful for replaying a captured webhook against a local bridge:
//!
//! ```bash
//! mailbridge-cli sign --body 'command=%2Femail&user_id=U1&trigger_id=1'
//! ```
//!
//! # Environment Variables
//!
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret

use secrecy::SecretString;
use slack_mailbridge::slack::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};

use super::CommandError;

/// Compute the timestamp and signature headers for `body`.
///
/// # Errors
///
/// Returns error if the signature cannot be computed.
pub fn signature_headers(
    secret: SecretString,
    body: &str,
    timestamp: i64,
) -> Result<[(&'static str, String); 2], CommandError> {
    let timestamp = timestamp.to_string();
    let signature = SignatureVerifier::new(secret).sign(&timestamp, body.as_bytes())?;
    Ok([(TIMESTAMP_HEADER, timestamp), (SIGNATURE_HEADER, signature)])
}

/// Print signed headers for `body`, stamped now unless `timestamp` is given.
///
/// # Errors
///
/// Returns error if `SLACK_SIGNING_SECRET` is unset or signing fails.
pub fn run(body: &str, timestamp: Option<i64>) -> Result<(), CommandError> {
    let secret = std::env::var("SLACK_SIGNING_SECRET")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(CommandError::MissingEnvVar("SLACK_SIGNING_SECRET"))?;

    let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());

    for (name, value) in signature_headers(SecretString::from(secret), body, timestamp)? {
        tracing::info!("{name}: {value}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_headers_verify() {
        let secret = "8f742231b10e8888abcd99yyyzzz85a5";
        let [(ts_name, ts), (sig_name, sig)] =
            signature_headers(SecretString::from(secret), "a=b", 1_700_000_000).expect("signs");

        assert_eq!(ts_name, TIMESTAMP_HEADER);
        assert_eq!(sig_name, SIGNATURE_HEADER);
        assert_eq!(ts, "1700000000");

        let verifier = SignatureVerifier::new(SecretString::from(secret));
        assert!(
            verifier
                .verify_parts(Some(&ts), Some(&sig), b"a=b", 1_700_000_000)
                .is_verified()
        );
    }
}
