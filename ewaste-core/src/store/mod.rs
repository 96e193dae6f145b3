//! Persistence ports and their adapters.
//!
//! Services hold the store as an injected `Arc<dyn ...>` so the Postgres
//! adapter and the in-memory adapter are interchangeable.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use crate::entities::listing::{InsertListing, ListingRecord};
use crate::entities::notification::NotificationRecord;
use crate::entities::request::{InsertRequest, RequestRecord};
use crate::entities::user::{InsertUser, UserRecord};
use crate::entities::{Decision, RequestStatus};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// What a committed decision changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDecision {
    /// The request as it is after the update.
    pub request: RequestRecord,
    /// The notification appended in the same transaction.
    pub notification: NotificationRecord,
}

/// Listings, requests and their notifications.
#[async_trait]
pub trait DisposalStore: Send + Sync {
    async fn insert_listing(&self, listing: InsertListing) -> StoreResult<ListingRecord>;

    /// All listings, newest first.
    async fn list_listings(&self) -> StoreResult<Vec<ListingRecord>>;

    /// Stores a new `Pending` request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ListingNotFound`] when `disposal_id` does not
    /// reference a listing. Nothing is stored in that case.
    async fn insert_request(&self, request: InsertRequest) -> StoreResult<RequestRecord>;

    /// All requests, newest first.
    async fn list_requests(&self) -> StoreResult<Vec<RequestRecord>>;

    /// Requests on one listing, newest first.
    async fn list_requests_for_listing(&self, disposal_id: i64) -> StoreResult<Vec<RequestRecord>>;

    /// Atomically moves a request out of `Pending` and appends its notification.
    ///
    /// The status read, the status write and the notification insert form one
    /// unit: concurrent calls for the same request are serialized and only one
    /// of them can succeed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RequestNotFound`] when the request does not exist
    /// and [`StoreError::InvalidTransition`] when it is no longer `Pending`.
    /// Neither case writes anything.
    async fn apply_decision(
        &self,
        request_id: i64,
        decision: Decision,
    ) -> StoreResult<AppliedDecision>;

    /// Notifications on one listing, most recent first.
    async fn list_notifications_for_listing(
        &self,
        disposal_id: i64,
    ) -> StoreResult<Vec<NotificationRecord>>;
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEmail`] when the email is taken.
    async fn insert_user(&self, user: InsertUser) -> StoreResult<UserRecord>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
}

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing not found: {0}")]
    ListingNotFound(i64),

    #[error("request not found: {0}")]
    RequestNotFound(i64),

    #[error("request {request_id} cannot move from {from} to {to}")]
    InvalidTransition {
        request_id: i64,
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// In-memory state lock was poisoned by a panicking writer.
    #[error("store state poisoned")]
    Poisoned,
}
