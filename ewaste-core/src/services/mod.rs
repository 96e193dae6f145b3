//! Application services.
//!
//! - `RequestLifecycle`: request submission and the approve/reject decision
//! - `ListingService`: listing creation and browsing
//! - `AccountService`: registration and login

pub mod accounts;
pub mod error;
pub mod lifecycle;
pub mod listings;

pub use accounts::AccountService;
pub use error::{ServiceError, ServiceResult};
pub use lifecycle::RequestLifecycle;
pub use listings::{ListingDraft, ListingService};
