//! Request lifecycle: submission, one-shot decisions and their side effects.

use super::error::ServiceResult;
use crate::entities::Decision;
use crate::entities::notification::NotificationRecord;
use crate::entities::request::{InsertRequest, RequestRecord};
use crate::events::{EmailEvent, EmailEventSender};
use crate::store::{AppliedDecision, DisposalStore};
use crate::validation::{ValidationError, required};
use ewaste_sdk::objects::CreateRequestBody;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, info};

/// Stateless coordinator over the injected store and email queue.
///
/// Every guarantee about concurrent decisions comes from
/// [`DisposalStore::apply_decision`]; this type only validates input and
/// dispatches the email once the store has committed.
#[derive(Clone)]
pub struct RequestLifecycle {
    store: Arc<dyn DisposalStore>,
    email_tx: EmailEventSender,
}

impl RequestLifecycle {
    pub fn new(store: Arc<dyn DisposalStore>, email_tx: EmailEventSender) -> Self {
        Self { store, email_tx }
    }

    /// Record a receiver's claim on a listing in the `Pending` state.
    ///
    /// # Errors
    ///
    /// `ServiceError::Validation` when a field is missing or blank, and
    /// `ServiceError::ListingNotFound` when the listing does not exist.
    pub async fn submit_request(&self, body: CreateRequestBody) -> ServiceResult<RequestRecord> {
        let insert = InsertRequest {
            disposal_id: body
                .disposal_id
                .ok_or(ValidationError::MissingField("disposal_id"))?,
            receiver_name: required("receiver_name", body.receiver_name)?,
            receiver_contact: required("receiver_contact", body.receiver_contact)?,
            receiver_email: required("receiver_email", body.receiver_email)?,
        };

        let request = self.store.insert_request(insert).await?;
        info!(
            request_id = request.id,
            disposal_id = request.disposal_id,
            "Request submitted"
        );
        Ok(request)
    }

    /// Move a pending request to `Approved` or `Rejected`.
    ///
    /// The status change and its notification are committed together before
    /// this returns. The email is queued afterwards and never awaited.
    ///
    /// # Errors
    ///
    /// `ServiceError::Validation` for a missing or unknown target status,
    /// `ServiceError::RequestNotFound` for an unknown id, and
    /// `ServiceError::InvalidTransition` when the request was already decided.
    pub async fn decide_request(
        &self,
        request_id: i64,
        target_status: Option<&str>,
    ) -> ServiceResult<AppliedDecision> {
        let decision = Decision::parse(target_status)?;
        let applied = self.store.apply_decision(request_id, decision).await?;

        info!(
            request_id,
            disposal_id = applied.request.disposal_id,
            status = %applied.request.status,
            "Request decided"
        );

        self.dispatch_email(&applied.request);
        Ok(applied)
    }

    pub async fn list_requests(&self) -> ServiceResult<Vec<RequestRecord>> {
        Ok(self.store.list_requests().await?)
    }

    pub async fn list_requests_for_listing(
        &self,
        disposal_id: i64,
    ) -> ServiceResult<Vec<RequestRecord>> {
        Ok(self.store.list_requests_for_listing(disposal_id).await?)
    }

    pub async fn list_notifications_for_listing(
        &self,
        disposal_id: i64,
    ) -> ServiceResult<Vec<NotificationRecord>> {
        Ok(self.store.list_notifications_for_listing(disposal_id).await?)
    }

    fn dispatch_email(&self, request: &RequestRecord) {
        let event = EmailEvent::RequestDecided {
            request_id: request.id,
            disposal_id: request.disposal_id,
            receiver_email: request.receiver_email.clone(),
            status: request.status,
        };

        match self.email_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                error!(request_id = request.id, "Email queue full, decision email dropped");
            }
            Err(TrySendError::Closed(_)) => {
                error!(request_id = request.id, "Email queue closed, decision email dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use crate::entities::RequestStatus;
    use crate::entities::listing::InsertListing;
    use crate::events::{EmailEventReceiver, email_event_channel};
    use crate::store::InMemoryStore;

    struct Harness {
        store: Arc<InMemoryStore>,
        lifecycle: RequestLifecycle,
        email_rx: EmailEventReceiver,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let (email_tx, email_rx) = email_event_channel();
        let lifecycle = RequestLifecycle::new(store.clone(), email_tx);
        Harness {
            store,
            lifecycle,
            email_rx,
        }
    }

    async fn listing(store: &InMemoryStore) -> i64 {
        store
            .insert_listing(InsertListing {
                image_url: None,
                item_name: "CRT monitor".to_string(),
                description: "works, heavy".to_string(),
                contact: "555-0100".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn body(disposal_id: i64) -> CreateRequestBody {
        CreateRequestBody {
            disposal_id: Some(disposal_id),
            receiver_name: Some("Ana".to_string()),
            receiver_contact: Some("555-0199".to_string()),
            receiver_email: Some("ana@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_pending_with_fresh_ids() {
        let h = harness();
        let disposal_id = listing(&h.store).await;

        let first = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();
        let second = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();

        assert_eq!(first.status, RequestStatus::Pending);
        assert_eq!(second.status, RequestStatus::Pending);
        assert_ne!(first.id, second.id);
        assert_eq!(first.disposal_id, disposal_id);
    }

    #[tokio::test]
    async fn test_submit_unknown_listing_is_not_found_and_stores_nothing() {
        let h = harness();
        let err = h.lifecycle.submit_request(body(404)).await.unwrap_err();
        assert!(matches!(err, ServiceError::ListingNotFound(404)));
        assert!(h.lifecycle.list_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_missing_field_is_validation_error() {
        let h = harness();
        let disposal_id = listing(&h.store).await;

        let mut missing_email = body(disposal_id);
        missing_email.receiver_email = None;
        let err = h.lifecycle.submit_request(missing_email).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingField("receiver_email"))
        ));

        let mut missing_id = body(disposal_id);
        missing_id.disposal_id = None;
        let err = h.lifecycle.submit_request(missing_id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingField("disposal_id"))
        ));
    }

    #[tokio::test]
    async fn test_decide_twice_fails_and_notifies_once() {
        let mut h = harness();
        let disposal_id = listing(&h.store).await;
        let request = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();

        h.lifecycle
            .decide_request(request.id, Some("Approved"))
            .await
            .unwrap();
        let err = h
            .lifecycle
            .decide_request(request.id, Some("Approved"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InvalidTransition {
                from: RequestStatus::Approved,
                to: RequestStatus::Approved,
                ..
            }
        ));
        let notifications = h
            .lifecycle
            .list_notifications_for_listing(disposal_id)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);

        assert!(h.email_rx.try_recv().is_ok());
        assert!(h.email_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_decide_invalid_status_leaves_request_pending() {
        let mut h = harness();
        let disposal_id = listing(&h.store).await;
        let request = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();

        for raw in [Some("Cancelled"), Some("Pending"), None] {
            let err = h
                .lifecycle
                .decide_request(request.id, raw)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ServiceError::Validation(ValidationError::InvalidStatus(_))
            ));
        }

        let requests = h
            .lifecycle
            .list_requests_for_listing(disposal_id)
            .await
            .unwrap();
        assert_eq!(requests[0].status, RequestStatus::Pending);
        assert!(
            h.lifecycle
                .list_notifications_for_listing(disposal_id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(h.email_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_decide_unknown_request_is_not_found() {
        let h = harness();
        let err = h
            .lifecycle
            .decide_request(77, Some("Rejected"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RequestNotFound(77)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decisions_have_exactly_one_winner() {
        let h = harness();
        let disposal_id = listing(&h.store).await;
        let request = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();

        let approve = {
            let lifecycle = h.lifecycle.clone();
            tokio::spawn(async move { lifecycle.decide_request(request.id, Some("Approved")).await })
        };
        let reject = {
            let lifecycle = h.lifecycle.clone();
            tokio::spawn(async move { lifecycle.decide_request(request.id, Some("Rejected")).await })
        };
        let (approve, reject) = (approve.await.unwrap(), reject.await.unwrap());

        let outcomes = [approve, reject];
        let winners: Vec<RequestStatus> = outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().ok())
            .map(|applied| applied.request.status)
            .collect();
        assert_eq!(winners.len(), 1);
        assert!(
            outcomes
                .iter()
                .any(|outcome| matches!(outcome, Err(ServiceError::InvalidTransition { .. })))
        );
        let winner = winners[0];

        let stored = h
            .lifecycle
            .list_requests_for_listing(disposal_id)
            .await
            .unwrap();
        assert_eq!(stored[0].status, winner);
        assert_eq!(
            h.lifecycle
                .list_notifications_for_listing(disposal_id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_rejected_example_flow() {
        let mut h = harness();
        let disposal_id = listing(&h.store).await;
        let request = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();

        let applied = h
            .lifecycle
            .decide_request(request.id, Some("Rejected"))
            .await
            .unwrap();
        assert_eq!(applied.request.status, RequestStatus::Rejected);
        assert_eq!(
            applied.notification.message,
            format!("Your request for item ID {disposal_id} has been Rejected.")
        );

        assert_eq!(
            h.email_rx.try_recv().unwrap(),
            EmailEvent::RequestDecided {
                request_id: request.id,
                disposal_id,
                receiver_email: "ana@example.com".to_string(),
                status: RequestStatus::Rejected,
            }
        );

        assert!(
            h.lifecycle
                .decide_request(request.id, Some("Approved"))
                .await
                .is_err()
        );
        let notifications = h
            .lifecycle
            .list_notifications_for_listing(disposal_id)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, applied.notification.message);
    }

    #[tokio::test]
    async fn test_closed_email_queue_does_not_fail_decision() {
        let h = harness();
        let disposal_id = listing(&h.store).await;
        let request = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();
        drop(h.email_rx);

        let applied = h
            .lifecycle
            .decide_request(request.id, Some("Approved"))
            .await
            .unwrap();
        assert_eq!(applied.request.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_notifications_are_most_recent_first() {
        let h = harness();
        let disposal_id = listing(&h.store).await;
        for _ in 0..3 {
            let request = h.lifecycle.submit_request(body(disposal_id)).await.unwrap();
            h.lifecycle
                .decide_request(request.id, Some("Approved"))
                .await
                .unwrap();
        }

        let notifications = h
            .lifecycle
            .list_notifications_for_listing(disposal_id)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 3);
        assert!(
            notifications
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at && pair[0].id > pair[1].id)
        );
    }
}
