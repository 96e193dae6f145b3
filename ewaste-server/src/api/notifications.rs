use axum::{Json, extract::State};
use ewaste_sdk::objects::Notification;

use super::ApiError;
use super::extractors::PathParam;
use crate::state::AppState;

/// `GET /api/notifications/{disposal_id}`: most recent first.
pub(super) async fn list_notifications_for_listing(
    State(state): State<AppState>,
    PathParam(disposal_id): PathParam<i64>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .lifecycle
        .list_notifications_for_listing(disposal_id)
        .await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}
