//! Delivery gateway: sends composed messages through the SMTP relay.
//!
//! Every attempt opens its own implicit-TLS connection, authenticates, sends
//! once and drops the transport. Nothing is pooled between requests.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use slack_mailbridge_core::{DeliveryResult, OutboundMessage};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The relay did not answer in time.
    #[error("SMTP relay timed out after {0}s")]
    Timeout(u64),
}

/// Sends outbound messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Make exactly one delivery attempt.
    async fn deliver(&self, message: &OutboundMessage) -> DeliveryResult;
}

/// [`Mailer`] backed by an authenticated SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    /// Create a mailer from configuration. No connection is made here.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// A fresh transport for a single attempt.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let credentials = Credentials::new(
            self.config.sender_address.clone(),
            self.config.sender_password.expose_secret().to_string(),
        );

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .credentials(credentials)
                .timeout(Some(self.config.smtp_timeout))
                .build(),
        )
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), EmailError> {
        let email = build_message(&self.config.sender_address, message)?;
        let transport = self.transport()?;

        tokio::time::timeout(self.config.smtp_timeout, transport.send(email))
            .await
            .map_err(|_| EmailError::Timeout(self.config.smtp_timeout.as_secs()))??;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(
        skip(self, message),
        fields(kind = ?message.kind(), relay = %self.config.smtp_host)
    )]
    async fn deliver(&self, message: &OutboundMessage) -> DeliveryResult {
        match self.send(message).await {
            Ok(()) => {
                info!(subject = %message.subject(), "Email delivered to relay");
                DeliveryResult::Sent
            }
            Err(e) => {
                error!(error = %e, "Email delivery failed");
                DeliveryResult::Failed(e.to_string())
            }
        }
    }
}

/// Build the plain-text email for an outbound message.
///
/// The user's contact address becomes `Reply-To` when it parses as a mailbox.
///
/// # Errors
///
/// Returns error if the sender or destination is not a valid mailbox.
pub fn build_message(from: &str, message: &OutboundMessage) -> Result<Message, EmailError> {
    let from: Mailbox = from
        .parse()
        .map_err(|_| EmailError::InvalidAddress(from.to_string()))?;
    let to: Mailbox = message
        .destination()
        .parse()
        .map_err(|_| EmailError::InvalidAddress(message.destination().to_string()))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject());

    if let Some(reply_to) = message
        .sender_address()
        .and_then(|address| address.as_str().parse::<Mailbox>().ok())
    {
        builder = builder.reply_to(reply_to);
    }

    Ok(builder
        .header(ContentType::TEXT_PLAIN)
        .body(message.body().to_string())?)
}
