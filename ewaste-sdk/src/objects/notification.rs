use serde::{Deserialize, Serialize};

/// A decision notice recorded against a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub disposal_id: i64,
    pub message: String,
    /// Unix timestamp (seconds) at which the notice was recorded.
    pub created_at: i64,
}
