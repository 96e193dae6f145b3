//! Extractors that report rejections through [`ApiError`].
//!
//! Axum's own `Json` and `Path` answer malformed input with plain-text 400/422
//! bodies. These wrappers turn the rejection into a `ValidationError` so every
//! failure carries the JSON `{"error": ...}` body.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use ewaste_core::validation::ValidationError;
use serde::de::DeserializeOwned;

use super::ApiError;

/// JSON request body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ValidationError::MalformedBody(rejection.body_text()).into()),
        }
    }
}

/// Typed path parameters.
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParam(value)),
            Err(rejection) => Err(ValidationError::MalformedBody(rejection.body_text()).into()),
        }
    }
}
