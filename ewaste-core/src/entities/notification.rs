use crate::entities::RequestStatus;
use crate::framework::DatabaseProcessor;
use ewaste_sdk::objects::Notification;
use kanau::processor::Processor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NotificationRecord {
    pub id: i64,
    pub disposal_id: i64,
    pub message: String,
    pub created_at: time::PrimitiveDateTime,
}

impl From<NotificationRecord> for Notification {
    fn from(record: NotificationRecord) -> Self {
        Notification {
            id: record.id,
            disposal_id: record.disposal_id,
            message: record.message,
            created_at: record.created_at.assume_utc().unix_timestamp(),
        }
    }
}

/// Text of the notice appended when a request on `disposal_id` is decided.
pub fn decision_message(disposal_id: i64, status: RequestStatus) -> String {
    format!("Your request for item ID {disposal_id} has been {status}.")
}

#[derive(Debug, Clone, Copy)]
/// Notifications for one listing, most recent first.
pub struct ListNotificationsForListing {
    pub disposal_id: i64,
}

impl Processor<ListNotificationsForListing> for DatabaseProcessor {
    type Output = Vec<NotificationRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListNotificationsForListing")]
    async fn process(
        &self,
        query: ListNotificationsForListing,
    ) -> Result<Vec<NotificationRecord>, sqlx::Error> {
        sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, disposal_id, message, created_at
            FROM notifications
            WHERE disposal_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(query.disposal_id)
        .fetch_all(&self.pool)
        .await
    }
}

impl NotificationRecord {
    /// Append a notification within a transaction.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        disposal_id: i64,
        message: &str,
    ) -> Result<NotificationRecord, sqlx::Error> {
        sqlx::query_as::<_, NotificationRecord>(
            r#"
            INSERT INTO notifications (disposal_id, message)
            VALUES ($1, $2)
            RETURNING id, disposal_id, message, created_at
            "#,
        )
        .bind(disposal_id)
        .bind(message)
        .fetch_one(&mut **tx)
        .await
    }
}
