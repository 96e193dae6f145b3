use super::{Notifier, NotifierError, OutboundEmail};
use async_trait::async_trait;
use tracing::info;

/// Notifier that only logs, used when no SMTP relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifierError> {
        info!(to = %email.to, subject = %email.subject, "Email delivery disabled, message logged only");
        Ok(())
    }
}
