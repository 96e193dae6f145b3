//! Event system decoupling committed writes from their slow side effects.
//!
//! # Event Flow
//!
//! 1. `RequestLifecycle` commits a decision, then emits `EmailEvent`
//! 2. `EmailSender` receives it and hands an `OutboundEmail` to the `Notifier`

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, EmailEventReceiver, EmailEventSender, email_event_channel,
};

pub use types::EmailEvent;
