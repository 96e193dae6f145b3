use axum::{Json, extract::State};
use ewaste_sdk::objects::{LoginBody, LoginResponse, MessageResponse, RegisterBody};

use super::ApiError;
use super::extractors::JsonBody;
use crate::state::AppState;

/// `POST /register`: create an account.
pub(super) async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.register(body).await?;
    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// `POST /login`: check credentials and return the public profile.
pub(super) async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.accounts.login(body).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: user.into(),
    }))
}
