//! In-memory store for tests and local runs without a database.

use super::{AppliedDecision, DisposalStore, StoreError, StoreResult, UserStore};
use crate::entities::listing::{InsertListing, ListingRecord};
use crate::entities::notification::{NotificationRecord, decision_message};
use crate::entities::request::{InsertRequest, RequestRecord};
use crate::entities::user::{InsertUser, UserRecord};
use crate::entities::{Decision, RequestStatus};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe in-memory store.
///
/// A single mutex covers every table, so `apply_decision` is serialized the
/// same way a row lock serializes it in Postgres.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    listings: Vec<ListingRecord>,
    requests: Vec<RequestRecord>,
    notifications: Vec<NotificationRecord>,
    users: Vec<UserRecord>,
    last_id: i64,
}

impl InMemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}

fn newest_first<T>(rows: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    rows.rev().collect()
}

#[async_trait]
impl DisposalStore for InMemoryStore {
    async fn insert_listing(&self, listing: InsertListing) -> StoreResult<ListingRecord> {
        let mut state = self.lock()?;
        let record = ListingRecord {
            id: state.next_id(),
            image_url: listing.image_url,
            item_name: listing.item_name,
            description: listing.description,
            contact: listing.contact,
        };
        state.listings.push(record.clone());
        Ok(record)
    }

    async fn list_listings(&self) -> StoreResult<Vec<ListingRecord>> {
        let state = self.lock()?;
        Ok(newest_first(state.listings.iter().cloned()))
    }

    async fn insert_request(&self, request: InsertRequest) -> StoreResult<RequestRecord> {
        let mut state = self.lock()?;
        if !state.listings.iter().any(|l| l.id == request.disposal_id) {
            return Err(StoreError::ListingNotFound(request.disposal_id));
        }
        let record = RequestRecord {
            id: state.next_id(),
            disposal_id: request.disposal_id,
            receiver_name: request.receiver_name,
            receiver_contact: request.receiver_contact,
            receiver_email: request.receiver_email,
            status: RequestStatus::Pending,
        };
        state.requests.push(record.clone());
        Ok(record)
    }

    async fn list_requests(&self) -> StoreResult<Vec<RequestRecord>> {
        let state = self.lock()?;
        Ok(newest_first(state.requests.iter().cloned()))
    }

    async fn list_requests_for_listing(&self, disposal_id: i64) -> StoreResult<Vec<RequestRecord>> {
        let state = self.lock()?;
        Ok(newest_first(
            state
                .requests
                .iter()
                .filter(|r| r.disposal_id == disposal_id)
                .cloned(),
        ))
    }

    async fn apply_decision(
        &self,
        request_id: i64,
        decision: Decision,
    ) -> StoreResult<AppliedDecision> {
        let target = decision.status();
        let mut state = self.lock()?;

        let index = state
            .requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or(StoreError::RequestNotFound(request_id))?;

        let current = state.requests[index].status;
        if !current.can_transition_to(target) {
            return Err(StoreError::InvalidTransition {
                request_id,
                from: current,
                to: target,
            });
        }

        state.requests[index].status = target;
        let request = state.requests[index].clone();

        let notification = NotificationRecord {
            id: state.next_id(),
            disposal_id: request.disposal_id,
            message: decision_message(request.disposal_id, target),
            created_at: now(),
        };
        state.notifications.push(notification.clone());

        Ok(AppliedDecision {
            request,
            notification,
        })
    }

    async fn list_notifications_for_listing(
        &self,
        disposal_id: i64,
    ) -> StoreResult<Vec<NotificationRecord>> {
        let state = self.lock()?;
        let mut notifications: Vec<_> = state
            .notifications
            .iter()
            .filter(|n| n.disposal_id == disposal_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(notifications)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: InsertUser) -> StoreResult<UserRecord> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = UserRecord {
            id: state.next_id(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        state.users.push(record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str) -> InsertListing {
        InsertListing {
            image_url: None,
            item_name: name.to_string(),
            description: "old hardware".to_string(),
            contact: "555-0100".to_string(),
        }
    }

    fn request_for(disposal_id: i64) -> InsertRequest {
        InsertRequest {
            disposal_id,
            receiver_name: "Ana".to_string(),
            receiver_contact: "555-0199".to_string(),
            receiver_email: "ana@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_listings_are_returned_newest_first() {
        let store = InMemoryStore::new();
        let first = store.insert_listing(listing("monitor")).await.unwrap();
        let second = store.insert_listing(listing("keyboard")).await.unwrap();

        let ids: Vec<_> = store
            .list_listings()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_insert_request_requires_existing_listing() {
        let store = InMemoryStore::new();
        let err = store.insert_request(request_for(99)).await.unwrap_err();
        assert!(matches!(err, StoreError::ListingNotFound(99)));
        assert!(store.list_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_decision_writes_nothing() {
        let store = InMemoryStore::new();
        let l = store.insert_listing(listing("phone")).await.unwrap();
        let r = store.insert_request(request_for(l.id)).await.unwrap();

        store.apply_decision(r.id, Decision::Approved).await.unwrap();
        let err = store
            .apply_decision(r.id, Decision::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                from: RequestStatus::Approved,
                to: RequestStatus::Rejected,
                ..
            }
        ));

        let requests = store.list_requests_for_listing(l.id).await.unwrap();
        assert_eq!(requests[0].status, RequestStatus::Approved);
        assert_eq!(
            store.list_notifications_for_listing(l.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let user = InsertUser {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "hash".to_string(),
        };
        store.insert_user(user.clone()).await.unwrap();
        let err = store.insert_user(user).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }
}
