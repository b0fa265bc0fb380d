//! Application services.
//!
//! Services tie the pure scheduling core to the card store.

pub mod review;

pub use review::{record_rating, record_review, record_review_from_snapshot, ServiceError};
