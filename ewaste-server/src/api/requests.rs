use axum::{Json, extract::State, http::StatusCode};
use ewaste_sdk::objects::{
    CreateRequestBody, CreatedResponse, DecideRequestBody, MessageResponse, Request,
};

use super::ApiError;
use super::extractors::{JsonBody, PathParam};
use crate::state::AppState;

/// `GET /api/requests`: every request, newest first.
pub(super) async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<Request>>, ApiError> {
    let requests = state.lifecycle.list_requests().await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// `POST /api/request`: claim a listing. The request starts `Pending`.
pub(super) async fn submit_request(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateRequestBody>,
) -> Result<(StatusCode, Json<CreatedResponse<Request>>), ApiError> {
    let request = state.lifecycle.submit_request(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Request submitted successfully".to_string(),
            data: request.into(),
        }),
    ))
}

/// `GET /api/requests/{disposal_id}`: requests on one listing, newest first.
pub(super) async fn list_requests_for_listing(
    State(state): State<AppState>,
    PathParam(disposal_id): PathParam<i64>,
) -> Result<Json<Vec<Request>>, ApiError> {
    let requests = state.lifecycle.list_requests_for_listing(disposal_id).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// `PUT /api/request/{id}`: approve or reject a pending request.
///
/// Responds once the decision and its notification are committed; the email
/// goes out in the background.
pub(super) async fn decide_request(
    State(state): State<AppState>,
    PathParam(request_id): PathParam<i64>,
    JsonBody(body): JsonBody<DecideRequestBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let applied = state
        .lifecycle
        .decide_request(request_id, body.status.as_deref())
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Request {} successfully!",
        applied.request.status
    ))))
}
