pub mod account;
pub mod listing;
pub mod notification;
pub mod request;

pub use account::{LoginBody, LoginResponse, RegisterBody, UserProfile};
pub use listing::Listing;
pub use notification::Notification;
pub use request::{CreateRequestBody, DecideRequestBody, Request, RequestStatus};

use serde::{Deserialize, Serialize};

/// Body returned by endpoints that only report an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned by endpoints that create a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse<T> {
    pub message: String,
    pub data: T,
}

/// Body returned for every failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
