//! Background processors.
//!
//! - `EmailSender`: delivers decision emails queued by the request lifecycle

pub mod email_sender;

pub use email_sender::EmailSender;
