//! Event type definitions.
//!
//! Events are emitted only after the store has committed the change they
//! describe, so a consumer never observes an event for a rolled-back write.

use crate::entities::RequestStatus;

/// Events that trigger outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailEvent {
    /// A request left `Pending`.
    RequestDecided {
        request_id: i64,
        disposal_id: i64,
        receiver_email: String,
        status: RequestStatus,
    },
}
