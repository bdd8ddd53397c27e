//! Core domain entities.
//!
//! Entities are plain immutable data; the only behavior they carry is
//! ordering, projection and formatting helpers.
//!
//! # Entity Types
//!
//! - [`ProductKey`] - Numeric product identifier
//! - [`ProductDetail`] / [`Price`] - Product metadata from the detail call
//! - [`LinkVariant`] - Closed set of affiliate link flavors
//! - [`LinkResult`] - Per-variant link outcome (resolved URL or failure cause)
//! - [`ProductBundle`] - Detail plus all link outcomes for one product

pub mod bundle;
pub mod link;
pub mod product;

pub use bundle::ProductBundle;
pub use link::{LinkOutcome, LinkResult, LinkVariant, UnknownVariant, VariantSet};
pub use product::{Price, ProductDetail, ProductKey};
