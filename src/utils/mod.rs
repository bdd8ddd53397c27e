//! Text helpers for message handling.
//!
//! - [`url_extractor`] - URL discovery, classification and product id extraction
//! - [`formatter`] - HTML captions for product bundles

pub mod formatter;
pub mod url_extractor;
