//! Application state shared across all request handlers.

use crate::uploads::UploadStore;
use ewaste_core::events::EmailEventSender;
use ewaste_core::services::{AccountService, ListingService, RequestLifecycle};
use ewaste_core::store::{DisposalStore, UserStore};
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: RequestLifecycle,
    pub listings: ListingService,
    pub accounts: AccountService,
    pub uploads: UploadStore,
}

impl AppState {
    /// Wire the services over the given stores and email queue.
    pub fn new(
        disposals: Arc<dyn DisposalStore>,
        users: Arc<dyn UserStore>,
        email_tx: EmailEventSender,
        uploads: UploadStore,
    ) -> Self {
        Self {
            lifecycle: RequestLifecycle::new(disposals.clone(), email_tx),
            listings: ListingService::new(disposals),
            accounts: AccountService::new(users),
            uploads,
        }
    }
}
