//! Wire types for the e-waste exchange backend.
//!
//! Everything in here is plain serde data shared between the HTTP layer and
//! its clients. Database representations live in `ewaste-core::entities`.

pub mod objects;
