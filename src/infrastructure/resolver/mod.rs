//! Affiliate short-link resolution.

mod short_link;

pub use short_link::{HttpShortLinkResolver, RESOLVE_TIMEOUT, accept_product_page};
