use crate::entities::RequestStatus;
use crate::framework::DatabaseProcessor;
use ewaste_sdk::objects::Request;
use kanau::processor::Processor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RequestRecord {
    pub id: i64,
    pub disposal_id: i64,
    pub receiver_name: String,
    pub receiver_contact: String,
    pub receiver_email: String,
    pub status: RequestStatus,
}

impl From<RequestRecord> for Request {
    fn from(record: RequestRecord) -> Self {
        Request {
            id: record.id,
            disposal_id: record.disposal_id,
            receiver_name: record.receiver_name,
            receiver_contact: record.receiver_contact,
            receiver_email: record.receiver_email,
            status: record.status.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Insert a new request in the `Pending` state.
///
/// A missing listing surfaces as a foreign-key violation from the database.
pub struct InsertRequest {
    pub disposal_id: i64,
    pub receiver_name: String,
    pub receiver_contact: String,
    pub receiver_email: String,
}

impl Processor<InsertRequest> for DatabaseProcessor {
    type Output = RequestRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertRequest")]
    async fn process(&self, insert: InsertRequest) -> Result<RequestRecord, sqlx::Error> {
        sqlx::query_as::<_, RequestRecord>(
            r#"
            INSERT INTO requests (disposal_id, receiver_name, receiver_contact, receiver_email, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, disposal_id, receiver_name, receiver_contact, receiver_email, status
            "#,
        )
        .bind(insert.disposal_id)
        .bind(insert.receiver_name)
        .bind(insert.receiver_contact)
        .bind(insert.receiver_email)
        .bind(RequestStatus::Pending)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
/// Requests newest first, optionally restricted to one listing.
pub struct ListRequests {
    pub disposal_id: Option<i64>,
}

impl Processor<ListRequests> for DatabaseProcessor {
    type Output = Vec<RequestRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListRequests")]
    async fn process(&self, query: ListRequests) -> Result<Vec<RequestRecord>, sqlx::Error> {
        match query.disposal_id {
            Some(disposal_id) => {
                sqlx::query_as::<_, RequestRecord>(
                    r#"
                    SELECT id, disposal_id, receiver_name, receiver_contact, receiver_email, status
                    FROM requests
                    WHERE disposal_id = $1
                    ORDER BY id DESC
                    "#,
                )
                .bind(disposal_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, RequestRecord>(
                    r#"
                    SELECT id, disposal_id, receiver_name, receiver_contact, receiver_email, status
                    FROM requests
                    ORDER BY id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
    }
}

impl RequestRecord {
    /// Load a request and hold its row lock until the transaction ends.
    ///
    /// Concurrent deciders on the same id queue here, so only the first one
    /// observes `Pending`.
    pub async fn lock_for_update_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        request_id: i64,
    ) -> Result<Option<RequestRecord>, sqlx::Error> {
        sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, disposal_id, receiver_name, receiver_contact, receiver_email, status
            FROM requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Update a request's status within a transaction.
    pub async fn update_status_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        request_id: i64,
        status: RequestStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE requests
            SET status = $1
            WHERE id = $2
            "#,
        )
        .bind(status)
        .bind(request_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
