//! Postgres adapter backed by the `kanau` processors in [`crate::entities`].

use super::{AppliedDecision, DisposalStore, StoreError, StoreResult, UserStore};
use crate::entities::Decision;
use crate::entities::listing::{InsertListing, ListListings, ListingRecord};
use crate::entities::notification::{
    ListNotificationsForListing, NotificationRecord, decision_message,
};
use crate::entities::request::{InsertRequest, ListRequests, RequestRecord};
use crate::entities::user::{GetUserByEmail, InsertUser, UserRecord};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseProcessor,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            db: DatabaseProcessor::new(pool),
        }
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl DisposalStore for PgStore {
    async fn insert_listing(&self, listing: InsertListing) -> StoreResult<ListingRecord> {
        Ok(self.db.process(listing).await?)
    }

    async fn list_listings(&self) -> StoreResult<Vec<ListingRecord>> {
        Ok(self.db.process(ListListings).await?)
    }

    async fn insert_request(&self, request: InsertRequest) -> StoreResult<RequestRecord> {
        let disposal_id = request.disposal_id;
        self.db.process(request).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::ListingNotFound(disposal_id)
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn list_requests(&self) -> StoreResult<Vec<RequestRecord>> {
        Ok(self.db.process(ListRequests { disposal_id: None }).await?)
    }

    async fn list_requests_for_listing(&self, disposal_id: i64) -> StoreResult<Vec<RequestRecord>> {
        Ok(self
            .db
            .process(ListRequests {
                disposal_id: Some(disposal_id),
            })
            .await?)
    }

    async fn apply_decision(
        &self,
        request_id: i64,
        decision: Decision,
    ) -> StoreResult<AppliedDecision> {
        let target = decision.status();
        let mut tx = self.db.pool.begin().await?;

        // Early returns drop `tx`, which rolls it back.
        let request = RequestRecord::lock_for_update_tx(&mut tx, request_id)
            .await?
            .ok_or(StoreError::RequestNotFound(request_id))?;

        if !request.status.can_transition_to(target) {
            debug!(
                request_id,
                current = %request.status,
                target = %target,
                "Rejecting decision on non-pending request"
            );
            return Err(StoreError::InvalidTransition {
                request_id,
                from: request.status,
                to: target,
            });
        }

        RequestRecord::update_status_tx(&mut tx, request_id, target).await?;

        let message = decision_message(request.disposal_id, target);
        let notification = NotificationRecord::insert_tx(&mut tx, request.disposal_id, &message).await?;

        tx.commit().await?;

        Ok(AppliedDecision {
            request: RequestRecord {
                status: target,
                ..request
            },
            notification,
        })
    }

    async fn list_notifications_for_listing(
        &self,
        disposal_id: i64,
    ) -> StoreResult<Vec<NotificationRecord>> {
        Ok(self
            .db
            .process(ListNotificationsForListing { disposal_id })
            .await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: InsertUser) -> StoreResult<UserRecord> {
        self.db.process(user).await.map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .db
            .process(GetUserByEmail {
                email: email.to_owned(),
            })
            .await?)
    }
}
