use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use ewaste_core::services::ListingDraft;
use ewaste_sdk::objects::{CreatedResponse, Listing};

use super::ApiError;
use crate::state::AppState;

/// An image part as read from the form.
struct ImagePart {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

/// `POST /api/dispose`: create a listing from a multipart form.
///
/// Text fields `item_name`, `description` and `contact` are required. The
/// `image` file part is optional; browsers send an empty part when no file
/// was picked, which counts as no image.
pub(super) async fn create_listing(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedResponse<Listing>>), ApiError> {
    let mut draft = ListingDraft::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    image = Some(ImagePart {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            Some("item_name") => draft.item_name = Some(field.text().await?),
            Some("description") => draft.description = Some(field.text().await?),
            Some("contact") => draft.contact = Some(field.text().await?),
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    // Reject the form before anything is written to disk.
    draft.validate()?;

    if let Some(image) = image {
        let reference = state
            .uploads
            .save(image.file_name.as_deref(), &image.bytes)
            .await?;
        draft.image_url = Some(reference);
    }

    let listing = state.listings.create_listing(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "E-waste uploaded successfully".to_string(),
            data: listing.into(),
        }),
    ))
}

/// `GET /api/disposals`: every listing, newest first.
pub(super) async fn list_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = state.listings.list_listings().await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}
