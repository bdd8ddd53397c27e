//! API route configuration.

use crate::api::handlers::{
    flush_cache_handler, get_product_handler, invalidate_product_handler, messages_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All `/api` routes.
///
/// # Endpoints
///
/// - `POST   /messages`       - Answer every product linked in a chat message
/// - `GET    /products/{id}`  - Deal bundle for one product (`?variants=coin,super`)
/// - `DELETE /products/{id}`  - Drop the cached bundle for one product
/// - `POST   /cache/flush`    - Drop every cached bundle and resolution
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages_handler))
        .route(
            "/products/{id}",
            get(get_product_handler).delete(invalidate_product_handler),
        )
        .route("/cache/flush", post(flush_cache_handler))
}
