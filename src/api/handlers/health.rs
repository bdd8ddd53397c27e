//! Handler for health check endpoint.

use axum::{Json, extract::State};

use crate::api::dto::health::HealthResponse;
use crate::infrastructure::cache::Evictable;
use crate::state::AppState;

/// Returns service liveness with cache occupancy.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "cache": { "entries": 12, "in_flight": 1 },
///   "resolved_urls": 4
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: state.cache().stats(),
        resolved_urls: state.resolved_urls.len(),
    })
}
