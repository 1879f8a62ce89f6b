//! Outbound email.
//!
//! Sending mail is an external collaborator: callers depend on [`Mailer`]
//! and production wires in [`SmtpMailer`].

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Sends plain-text mail through an authenticated SMTP relay (implicit TLS).
pub struct SmtpMailer {
    from: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {}", e)))?
            .credentials(creds)
            .port(config.smtp_port)
            .build();

        Ok(Self {
            from: config.from.clone(),
            transport,
        })
    }
}

fn build_message(from: &str, to: &str, subject: &str, body: &str) -> Result<Message, MailError> {
    let parse = |address: &str| {
        address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
    };

    Message::builder()
        .from(parse(from)?)
        .to(parse(to)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let email = build_message(&self.from, to, subject, body)?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        log::info!("📧 Email sent to {}: {}", to, response.code());
        Ok(())
    }
}
