//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `POST /register`                          – create an account
//! - `POST /login`                             – check credentials
//! - `POST /api/dispose`                       – create a listing (multipart, optional image)
//! - `GET  /api/disposals`                     – all listings, newest first
//! - `GET  /api/requests`                      – all requests, newest first
//! - `POST /api/request`                       – submit a request on a listing
//! - `GET  /api/requests/{disposal_id}`        – requests on one listing
//! - `PUT  /api/request/{id}`                  – approve or reject a pending request
//! - `GET  /api/notifications/{disposal_id}`   – notifications on one listing

use axum::{
    Json, Router,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use ewaste_core::services::ServiceError;
use ewaste_core::validation::ValidationError;
use ewaste_sdk::objects::ErrorResponse;

use crate::state::AppState;
use crate::uploads::UploadError;

mod accounts;
mod disposals;
pub mod extractors;
mod notifications;
mod requests;


/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/api/dispose", post(disposals::create_listing))
        .route("/api/disposals", get(disposals::list_listings))
        .route("/api/requests", get(requests::list_requests))
        .route("/api/request", post(requests::submit_request))
        .route(
            "/api/requests/{disposal_id}",
            get(requests::list_requests_for_listing),
        )
        .route("/api/request/{id}", put(requests::decide_request))
        .route(
            "/api/notifications/{disposal_id}",
            get(notifications::list_notifications_for_listing),
        )
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// The multipart stream was malformed or exceeded the body limit.
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Service(ServiceError::Validation(err))
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        let service = match self {
            ApiError::Service(e) => e,
            ApiError::Upload(_) => return internal(),
            ApiError::Multipart(e) => {
                return (e.status(), "Invalid request body!".to_string());
            }
        };
        match service {
            ServiceError::Validation(ValidationError::MissingField(_)) => {
                (StatusCode::BAD_REQUEST, "All fields are required!".to_string())
            }
            ServiceError::Validation(ValidationError::InvalidStatus(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid status!".to_string())
            }
            ServiceError::Validation(ValidationError::MalformedBody(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid request body!".to_string())
            }
            ServiceError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ServiceError::ListingNotFound(_) => {
                (StatusCode::NOT_FOUND, "Listing not found!".to_string())
            }
            ServiceError::RequestNotFound(_) => {
                (StatusCode::NOT_FOUND, "Request not found!".to_string())
            }
            ServiceError::InvalidTransition { from, .. } => {
                (StatusCode::CONFLICT, format!("Request is already {from}!"))
            }
            ServiceError::ConstraintViolation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error (email may already exist)".to_string(),
            ),
            ServiceError::Hashing(_) | ServiceError::Store(_) => internal(),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "API internal error");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "API request rejected");
        }
        (status, Json(ErrorResponse { error })).into_response()
    }
}
