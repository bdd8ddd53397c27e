//! Handlers for single-product lookups and invalidation.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::product::{InvalidateResponse, ProductQuery};
use crate::application::services::ProductReply;
use crate::domain::entities::{LinkVariant, ProductKey, VariantSet};
use crate::error::AppError;
use crate::state::AppState;

fn parse_product_id(raw: &str) -> Result<ProductKey, AppError> {
    ProductKey::parse(raw).ok_or_else(|| {
        AppError::bad_request(
            "Product id must be numeric",
            json!({ "product_id": raw }),
        )
    })
}

fn parse_variants(query: &ProductQuery, defaults: &VariantSet) -> Result<VariantSet, AppError> {
    let Some(raw) = &query.variants else {
        return Ok(defaults.clone());
    };

    let variants = LinkVariant::parse_list(raw).map_err(|e| {
        AppError::bad_request(
            e.to_string(),
            json!({ "allowed": LinkVariant::ALL.map(LinkVariant::key) }),
        )
    })?;

    if variants.is_empty() {
        return Err(AppError::bad_request(
            "At least one variant is required",
            json!({ "allowed": LinkVariant::ALL.map(LinkVariant::key) }),
        ));
    }

    Ok(variants)
}

/// Returns the deal bundle for one product.
///
/// # Endpoint
///
/// `GET /api/products/{id}?variants=coin,super`
///
/// # Errors
///
/// - 400 Bad Request for a non-numeric id or an unknown variant
/// - 503 Service Unavailable when every upstream call failed
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductReply>, AppError> {
    let product_id = parse_product_id(&id)?;
    let variants = parse_variants(&query, state.deal_service.default_variants())?;

    let reply = state.deal_service.lookup(&product_id, &variants).await?;
    Ok(Json(reply))
}

/// Drops the cached bundle for one product.
///
/// # Endpoint
///
/// `DELETE /api/products/{id}`
///
/// # Errors
///
/// - 400 Bad Request for a non-numeric id
/// - 404 Not Found if nothing was cached for the product
pub async fn invalidate_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let product_id = parse_product_id(&id)?;

    if !state.cache().invalidate(&product_id) {
        return Err(AppError::not_found(
            "No cached bundle for product",
            json!({ "product_id": product_id }),
        ));
    }

    Ok(Json(InvalidateResponse {
        product_id,
        invalidated: true,
    }))
}
