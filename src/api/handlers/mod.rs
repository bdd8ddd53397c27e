//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod cache;
pub mod health;
pub mod messages;
pub mod products;

pub use cache::flush_cache_handler;
pub use health::health_handler;
pub use messages::messages_handler;
pub use products::{get_product_handler, invalidate_product_handler};
