//! Outbound message port.
//!
//! A [`Notifier`] is only ever driven by the [`EmailSender`](crate::processors::EmailSender)
//! background task. Its outcome is logged and never reaches an API caller.

pub mod log;
pub mod smtp;

pub use log::LogNotifier;
pub use smtp::{SmtpNotifier, SmtpSettings};

use crate::entities::RequestStatus;
use async_trait::async_trait;
use thiserror::Error;

/// A fully rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    /// Mail telling a receiver how their request was decided.
    pub fn request_decided(to: impl Into<String>, disposal_id: i64, status: RequestStatus) -> Self {
        Self {
            to: to.into(),
            subject: format!("Your E-Waste Request has been {status}"),
            body: format!(
                "Hello,\n\nYour request for the e-waste item (ID: {disposal_id}) has been {status}.\n\nThank you for using our system!\nE-Waste Management Team"
            ),
        }
    }
}

/// Errors that can occur during email delivery.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Best-effort message delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifierError>;
}
