pub mod listing;
pub mod notification;
pub mod request;
pub mod user;

use crate::validation::ValidationError;
use ewaste_sdk::objects::RequestStatus as SdkRequestStatus;
use std::str::FromStr;

/// Request status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `ewaste_sdk::objects::RequestStatus`.
/// Stored as the Postgres enum `request_status`, so free-form text never
/// reaches the `requests.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// `Pending` is the only state with outgoing transitions.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        SdkRequestStatus::from(*self).fmt(f)
    }
}

impl From<RequestStatus> for SdkRequestStatus {
    fn from(value: RequestStatus) -> Self {
        match value {
            RequestStatus::Pending => SdkRequestStatus::Pending,
            RequestStatus::Approved => SdkRequestStatus::Approved,
            RequestStatus::Rejected => SdkRequestStatus::Rejected,
        }
    }
}

impl From<SdkRequestStatus> for RequestStatus {
    fn from(value: SdkRequestStatus) -> Self {
        match value {
            SdkRequestStatus::Pending => RequestStatus::Pending,
            SdkRequestStatus::Approved => RequestStatus::Approved,
            SdkRequestStatus::Rejected => RequestStatus::Rejected,
        }
    }
}

/// The outcome an approver may assign to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn status(self) -> RequestStatus {
        match self {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }

    /// Parse the optional `status` field of a decision body.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        raw.ok_or(ValidationError::InvalidStatus(None))?.parse()
    }
}

impl FromStr for Decision {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(Decision::Approved),
            "Rejected" => Ok(Decision::Rejected),
            other => Err(ValidationError::InvalidStatus(Some(other.to_owned()))),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.status().fmt(f)
    }
}
