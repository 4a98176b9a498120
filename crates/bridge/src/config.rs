//! Bridge configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SLACK_BOT_TOKEN` - Slack bot token (xoxb-...)
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret
//! - `EMAIL_SENDER` - Relay login and `From` address
//! - `EMAIL_PASSWORD` - Relay password (an app password for Gmail)
//! - `SUPPORT_EMAIL` - Address every message is delivered to
//!
//! ## Optional
//! - `BRIDGE_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 5000)
//! - `SLACK_COMMAND` - Slash command that opens the form (default: /email)
//! - `SMTP_HOST` - Relay hostname (default: smtp.gmail.com)
//! - `SMTP_PORT` - Relay implicit-TLS port (default: 465)
//! - `SMTP_TIMEOUT_SECS` - Per-delivery timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)
//!
//! Values are trimmed; a variable that is empty after trimming counts as unset.

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SLACK_COMMAND: &str = "/email";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Slack app configuration
    pub slack: SlackConfig,
    /// Relay and addressing configuration
    pub email: EmailConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Slack app configuration.
///
/// Implements `Debug` manually to redact secrets.
#[derive(Clone)]
pub struct SlackConfig {
    /// Slack bot token (xoxb-...).
    pub bot_token: SecretString,
    /// Slack app signing secret for webhook verification.
    pub signing_secret: SecretString,
    /// Slash command that opens the support form.
    pub command: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("signing_secret", &"[REDACTED]")
            .field("command", &self.command)
            .finish()
    }
}

/// Email relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// Relay hostname
    pub smtp_host: String,
    /// Relay port (implicit TLS)
    pub smtp_port: u16,
    /// Timeout for a single delivery attempt
    pub smtp_timeout: Duration,
    /// Relay login, also used as the `From` address
    pub sender_address: String,
    /// Relay password
    pub sender_password: SecretString,
    /// Destination of every message
    pub support_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_timeout", &self.smtp_timeout)
            .field("sender_address", &self.sender_address)
            .field("sender_password", &"[REDACTED]")
            .field("support_address", &self.support_address)
            .finish()
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.get_parsed("BRIDGE_HOST", "0.0.0.0")?;
        let port = env.get_parsed("PORT", "5000")?;
        let slack = SlackConfig::from_env(&env)?;
        let email = EmailConfig::from_env(&env)?;
        let sentry_dsn = env.get_optional_env("SENTRY_DSN");
        let sentry_environment = env.get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            slack,
            email,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Slack secrets that look like placeholders or have low entropy.
    ///
    /// Weak values are allowed to start; Slack issues these, so callers only
    /// warn.
    #[must_use]
    pub fn weak_secrets(&self) -> Vec<ConfigError> {
        [
            ("SLACK_BOT_TOKEN", &self.slack.bot_token),
            ("SLACK_SIGNING_SECRET", &self.slack.signing_secret),
        ]
        .into_iter()
        .filter_map(|(name, secret)| validate_secret_strength(secret.expose_secret(), name).err())
        .collect()
    }

    /// Log a warning for every weak Slack secret.
    ///
    /// Call after the tracing subscriber is installed.
    pub fn warn_weak_secrets(&self) {
        for weakness in self.weak_secrets() {
            tracing::warn!("{weakness}");
        }
    }
}

impl SlackConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let bot_token = env.get_required_env("SLACK_BOT_TOKEN")?;
        let signing_secret = env.get_required_env("SLACK_SIGNING_SECRET")?;

        let command = env.get_env_or_default("SLACK_COMMAND", DEFAULT_SLACK_COMMAND);
        if !command.starts_with('/') {
            return Err(ConfigError::InvalidEnvVar(
                "SLACK_COMMAND".to_string(),
                "must start with '/'".to_string(),
            ));
        }

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            signing_secret: SecretString::from(signing_secret),
            command,
        })
    }
}

impl EmailConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let smtp_timeout_secs: u64 = env.get_parsed("SMTP_TIMEOUT_SECS", "30")?;
        if smtp_timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SMTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            smtp_host: env.get_env_or_default("SMTP_HOST", DEFAULT_SMTP_HOST),
            smtp_port: env.get_parsed("SMTP_PORT", "465")?,
            smtp_timeout: Duration::from_secs(smtp_timeout_secs),
            sender_address: env.get_address("EMAIL_SENDER")?,
            sender_password: SecretString::from(env.get_required_env("EMAIL_PASSWORD")?),
            support_address: env.get_address("SUPPORT_EMAIL")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with trimming and empty-as-unset semantics.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional environment variable.
    fn get_optional_env(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a required environment variable.
    fn get_required_env(&self, key: &str) -> Result<String, ConfigError> {
        self.get_optional_env(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an environment variable with a default value.
    fn get_env_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional_env(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse an environment variable, falling back to `default`.
    fn get_parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get_env_or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get a required variable holding an email address.
    fn get_address(&self, key: &str) -> Result<String, ConfigError> {
        let value = self.get_required_env(key)?;
        if !value.contains('@') {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "not an email address".to_string(),
            ));
        }
        Ok(value)
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` describing the weakness.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
