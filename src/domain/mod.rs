//! Domain layer: entities, the upstream contract and domain errors.
//!
//! Nothing in here depends on HTTP, caching or the concrete API client.
//!
//! - [`entities`] - Product, link and bundle data
//! - [`upstream`] - [`upstream::UpstreamClient`] trait implemented by infrastructure
//! - [`builder`] - [`builder::BundleBuilder`] trait the cache fills itself through
//! - [`resolver`] - [`resolver::LinkResolver`] trait for affiliate short links
//! - [`errors`] - [`errors::BundleError`] returned across the cache boundary

pub mod builder;
pub mod entities;
pub mod errors;
pub mod resolver;
pub mod upstream;

pub use builder::BundleBuilder;
pub use errors::BundleError;
pub use resolver::{LinkResolver, ResolveError};
pub use upstream::{UpstreamClient, UpstreamError};

#[cfg(test)]
pub use resolver::MockLinkResolver;
#[cfg(test)]
pub use upstream::MockUpstreamClient;
