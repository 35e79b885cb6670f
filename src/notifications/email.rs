//! Email delivery for expiration notices.
//!
//! The sweep hands each notice to an `EmailSender` after the notification row
//! is committed. The default `LogEmailSender` logs and returns `Ok(())`; a real
//! transport (SMTP, provider API) implements the same trait.

use anyhow::Result;
use tracing::info;

pub const EXPIRATION_SUBJECT: &str = "Expiration Notice";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    #[must_use]
    pub fn expiration(to_email: String, body: String) -> Self {
        Self {
            to_email,
            subject: EXPIRATION_SUBJECT.to_string(),
            body,
        }
    }
}

pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error; failures are logged by the caller.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_message_has_subject() {
        let message = EmailMessage::expiration(
            "ada@example.com".to_string(),
            "Your passport is expiring on 2026-05-06.".to_string(),
        );
        assert_eq!(message.subject, "Expiration Notice");
        assert!(LogEmailSender.send(&message).is_ok());
    }
}
