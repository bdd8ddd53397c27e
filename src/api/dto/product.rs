//! DTOs for product endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::entities::ProductKey;

/// Query string of `GET /api/products/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Comma-separated variant keys, e.g. `coin,super`. Defaults to the
    /// configured variant set.
    pub variants: Option<String>,
}

/// Result of an explicit invalidation.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub product_id: ProductKey,
    pub invalidated: bool,
}

/// Result of a full cache flush.
#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub flushed: usize,
    pub resolved_urls_flushed: usize,
}
