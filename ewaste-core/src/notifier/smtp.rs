//! SMTP notifier using Lettre.

use super::{Notifier, NotifierError, OutboundEmail};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// Connection settings for the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay host, e.g. `smtp.gmail.com`.
    pub server: String,
    /// Usually 587 (STARTTLS) or 465 (TLS).
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
    /// Upper bound on one delivery attempt, enforced by the transport.
    pub timeout: Duration,
}

/// Sends mail through an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the notifier. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns an error when the sender address does not parse or the relay
    /// host is invalid.
    pub fn new(settings: SmtpSettings) -> Result<Self, NotifierError> {
        let address: Address = settings
            .from_address
            .parse()
            .map_err(|e| NotifierError::InvalidAddress(format!("{}: {e}", settings.from_address)))?;
        let from = Mailbox::new(Some(settings.from_name), address);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.server)
            .map_err(|e| NotifierError::Transport(format!("SMTP relay error: {e}")))?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifierError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotifierError::InvalidAddress(format!("{}: {e}", email.to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| NotifierError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| NotifierError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(from_address: &str) -> SmtpSettings {
        SmtpSettings {
            server: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from_address: from_address.to_string(),
            from_name: "E-Waste Management".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_sender() {
        assert!(matches!(
            SmtpNotifier::new(settings("not-an-address")),
            Err(NotifierError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_recipient_before_connecting() {
        let notifier = SmtpNotifier::new(settings("noreply@example.com")).unwrap();
        let email = OutboundEmail {
            to: "nobody".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(matches!(
            notifier.send(&email).await,
            Err(NotifierError::InvalidAddress(_))
        ));
    }
}
