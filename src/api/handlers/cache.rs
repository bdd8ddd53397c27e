//! Handler for cache administration.

use axum::{Json, extract::State};

use crate::api::dto::product::FlushResponse;
use crate::state::AppState;

/// Drops every cached bundle and short-link resolution.
///
/// # Endpoint
///
/// `POST /api/cache/flush`
///
/// In-flight builds are not cancelled; their results are stored when they
/// complete.
pub async fn flush_cache_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    Json(FlushResponse {
        flushed: state.cache().flush(),
        resolved_urls_flushed: state.resolved_urls.clear(),
    })
}
