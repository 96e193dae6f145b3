//! Event channel factories and handles.

use super::types::EmailEvent;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for EmailEvent events.
pub type EmailEventSender = mpsc::Sender<EmailEvent>;
/// Receiver handle for EmailEvent events.
pub type EmailEventReceiver = mpsc::Receiver<EmailEvent>;

/// Create a new EmailEvent channel.
///
/// Returns a (sender, receiver) pair for EmailEvent events.
/// The sender is cloned into every service that emits mail.
pub fn email_event_channel() -> (EmailEventSender, EmailEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
