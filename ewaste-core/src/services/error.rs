use crate::entities::RequestStatus;
use crate::store::StoreError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Service-level errors, one variant per failure class callers react to.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("listing {0} not found")]
    ListingNotFound(i64),

    #[error("request {0} not found")]
    RequestNotFound(i64),

    #[error("request {request_id} is already {from}, cannot become {to}")]
    InvalidTransition {
        request_id: i64,
        from: RequestStatus,
        to: RequestStatus,
    },

    /// Uniqueness or similar constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(&'static str),

    /// Password hashing failed or its task died.
    #[error("credential hashing failed: {0}")]
    Hashing(String),

    /// Connectivity or other unclassified persistence failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ListingNotFound(id) => ServiceError::ListingNotFound(id),
            StoreError::RequestNotFound(id) => ServiceError::RequestNotFound(id),
            StoreError::InvalidTransition {
                request_id,
                from,
                to,
            } => ServiceError::InvalidTransition {
                request_id,
                from,
                to,
            },
            StoreError::DuplicateEmail => ServiceError::ConstraintViolation("users.email"),
            other => ServiceError::Store(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
