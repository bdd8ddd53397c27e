//! Data Transfer Objects for API requests and responses.
//!
//! Response bodies for bundles reuse the application types directly
//! ([`crate::application::services::ProductReply`] and
//! [`crate::application::services::MessageReport`]).

pub mod health;
pub mod messages;
pub mod product;
