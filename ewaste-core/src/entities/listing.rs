use crate::framework::DatabaseProcessor;
use ewaste_sdk::objects::Listing;
use kanau::processor::Processor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ListingRecord {
    pub id: i64,
    pub image_url: Option<String>,
    pub item_name: String,
    pub description: String,
    pub contact: String,
}

impl From<ListingRecord> for Listing {
    fn from(record: ListingRecord) -> Self {
        Listing {
            id: record.id,
            image_url: record.image_url,
            item_name: record.item_name,
            description: record.description,
            contact: record.contact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Insert a new disposal listing and return the stored row.
pub struct InsertListing {
    pub image_url: Option<String>,
    pub item_name: String,
    pub description: String,
    pub contact: String,
}

impl Processor<InsertListing> for DatabaseProcessor {
    type Output = ListingRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertListing")]
    async fn process(&self, insert: InsertListing) -> Result<ListingRecord, sqlx::Error> {
        sqlx::query_as::<_, ListingRecord>(
            r#"
            INSERT INTO disposal (image_url, item_name, description, contact)
            VALUES ($1, $2, $3, $4)
            RETURNING id, image_url, item_name, description, contact
            "#,
        )
        .bind(insert.image_url)
        .bind(insert.item_name)
        .bind(insert.description)
        .bind(insert.contact)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
/// All listings, newest first.
pub struct ListListings;

impl Processor<ListListings> for DatabaseProcessor {
    type Output = Vec<ListingRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListListings")]
    async fn process(&self, _query: ListListings) -> Result<Vec<ListingRecord>, sqlx::Error> {
        sqlx::query_as::<_, ListingRecord>(
            r#"
            SELECT id, image_url, item_name, description, contact
            FROM disposal
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
