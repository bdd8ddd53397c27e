//! # AliExpress Deals
//!
//! Affiliate deal links for AliExpress products, served over HTTP from a
//! coalescing TTL cache.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities plus the upstream, builder and resolver traits
//! - **Application Layer** ([`application`]) - Bundle aggregation and message handling
//! - **Infrastructure Layer** ([`infrastructure`]) - AliExpress client, caches, evictor, resolver
//! - **API Layer** ([`api`]) - REST handlers, DTOs and middleware
//!
//! ## Features
//!
//! - One upstream build per product no matter how many concurrent requests ask for it
//! - Partial bundles: a failed link only fails its own line
//! - Periodic eviction of expired bundles and short-link resolutions
//! - Signed, retried calls to the affiliate API
//!
//! ## Quick Start
//!
//! ```bash
//! export ALIEXPRESS_APP_KEY="..."
//! export ALIEXPRESS_APP_SECRET="..."
//!
//! cargo run
//! curl -X POST localhost:5000/api/messages -H 'content-type: application/json' \
//!      -d '{"text":"https://www.aliexpress.com/item/1005001.html"}'
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        BundleAggregator, DealService, ProductReply, ReplyStatus,
    };
    pub use crate::domain::entities::{
        LinkOutcome, LinkResult, LinkVariant, ProductBundle, ProductDetail, ProductKey, VariantSet,
    };
    pub use crate::domain::{
        BundleBuilder, BundleError, LinkResolver, UpstreamClient, UpstreamError,
    };
    pub use crate::error::AppError;
    pub use crate::infrastructure::cache::{BundleCache, Evictor, ResolvedUrlCache};
    pub use crate::state::AppState;
}
