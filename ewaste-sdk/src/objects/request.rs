//! Receiver request types.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Request status for API responses.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `ewaste-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Approved" => Ok(RequestStatus::Approved),
            "Rejected" => Ok(RequestStatus::Rejected),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A receiver's claim on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: i64,
    pub disposal_id: i64,
    pub receiver_name: String,
    pub receiver_contact: String,
    pub receiver_email: String,
    pub status: RequestStatus,
}

/// Body of `POST /api/request`.
///
/// Every field is optional on the wire so that a missing field is reported
/// as a validation failure instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequestBody {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub disposal_id: Option<i64>,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub receiver_contact: Option<String>,
    #[serde(default)]
    pub receiver_email: Option<String>,
}

/// Body of `PUT /api/request/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideRequestBody {
    #[serde(default)]
    pub status: Option<String>,
}

/// Browser forms tend to send ids as strings, so accept `7` and `"7"` alike.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
