//! DTOs for health check endpoint.

use serde::Serialize;

use crate::infrastructure::cache::CacheStats;

/// Health check response with cache occupancy.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cache: CacheStats,
    /// Entries in the short-link resolution cache.
    pub resolved_urls: usize,
}
