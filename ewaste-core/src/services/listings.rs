use super::error::ServiceResult;
use crate::entities::listing::{InsertListing, ListingRecord};
use crate::store::DisposalStore;
use crate::validation::{ValidationError, required};
use std::sync::Arc;
use tracing::info;

/// Unvalidated listing fields as collected from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingDraft {
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub image_url: Option<String>,
}

impl ListingDraft {
    /// Check the required fields without consuming the draft.
    ///
    /// Callers that store an image first run this so a rejected form leaves no
    /// orphaned upload behind.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.clone().into_insert().map(|_| ())
    }

    fn into_insert(self) -> Result<InsertListing, ValidationError> {
        Ok(InsertListing {
            item_name: required("item_name", self.item_name)?,
            description: required("description", self.description)?,
            contact: required("contact", self.contact)?,
            image_url: self.image_url,
        })
    }
}

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn DisposalStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn DisposalStore>) -> Self {
        Self { store }
    }

    pub async fn create_listing(&self, draft: ListingDraft) -> ServiceResult<ListingRecord> {
        let listing = self.store.insert_listing(draft.into_insert()?).await?;
        info!(disposal_id = listing.id, "Listing created");
        Ok(listing)
    }

    /// Newest first.
    pub async fn list_listings(&self) -> ServiceResult<Vec<ListingRecord>> {
        Ok(self.store.list_listings().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use crate::store::InMemoryStore;

    fn draft() -> ListingDraft {
        ListingDraft {
            item_name: Some("Laptop".to_string()),
            description: Some("Broken hinge".to_string()),
            contact: Some("555-0100".to_string()),
            image_url: Some("/uploads/1700000000000-laptop.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let service = ListingService::new(Arc::new(InMemoryStore::new()));
        let first = service.create_listing(draft()).await.unwrap();
        let second = service
            .create_listing(ListingDraft {
                image_url: None,
                ..draft()
            })
            .await
            .unwrap();

        assert_eq!(
            first.image_url.as_deref(),
            Some("/uploads/1700000000000-laptop.jpg")
        );
        assert_eq!(second.image_url, None);

        let listed = service.list_listings().await.unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected_before_store() {
        let service = ListingService::new(Arc::new(InMemoryStore::new()));
        let incomplete = ListingDraft {
            contact: Some("  ".to_string()),
            ..draft()
        };

        assert_eq!(
            incomplete.validate(),
            Err(ValidationError::MissingField("contact"))
        );
        assert!(matches!(
            service.create_listing(incomplete).await,
            Err(ServiceError::Validation(ValidationError::MissingField("contact")))
        ));
        assert!(service.list_listings().await.unwrap().is_empty());
    }
}
