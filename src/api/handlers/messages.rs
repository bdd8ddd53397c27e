//! Handler for chat message processing.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::messages::MessageRequest;
use crate::application::services::MessageReport;
use crate::error::AppError;
use crate::state::AppState;

/// Extracts AliExpress products from a message and answers each one.
///
/// # Endpoint
///
/// `POST /api/messages`
///
/// # Request Body
///
/// ```json
/// { "text": "check this https://s.click.aliexpress.com/e/_DdwUZVd" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "summary": { "total": 1, "successful": 1, "failed": 0 },
///   "items": [
///     {
///       "product_id": "1005001",
///       "status": "ok",
///       "caption": "<b>Wireless earbuds</b>\n...",
///       "bundle": { "product_id": "1005001", "detail": {...}, "links": [...] }
///     }
///   ]
/// }
/// ```
///
/// Products whose upstream calls all failed are reported per item with
/// status `unavailable`; the request itself still succeeds.
///
/// # Errors
///
/// Returns 400 Bad Request if the text is empty or too long, or holds no
/// resolvable AliExpress product link.
pub async fn messages_handler(
    State(state): State<AppState>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<MessageReport>, AppError> {
    payload.validate()?;

    let report = state.deal_service.handle_message(&payload.text).await?;
    Ok(Json(report))
}
