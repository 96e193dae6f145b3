use serde::{Deserialize, Serialize};

/// A posted e-waste item as returned by `/api/disposals` and `/api/dispose`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    /// Public path of the uploaded image (`/uploads/...`), if one was attached.
    pub image_url: Option<String>,
    pub item_name: String,
    pub description: String,
    pub contact: String,
}
