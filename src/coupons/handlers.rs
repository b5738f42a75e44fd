//! REST API handlers for coupon and promotion-code lookups

use crate::checkout::state::SharedState;
use crate::errors::CheckoutError;
use crate::gateway::models::{Coupon, PromotionCode, PromotionCodeFilter};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};

/// Creates routes for coupon-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/coupons", get(list_coupons))
        .route("/coupons/:id", get(get_coupon))
        .route("/coupons/:id/expanded", get(get_coupon_expanded))
        .route("/promotion-codes", get(list_promotion_codes))
        .route("/promotion-codes/:id", get(get_promotion_code))
}

async fn list_coupons(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Coupon>>, CheckoutError> {
    Ok(Json(state.coupons.list_coupons().await?))
}

async fn get_coupon(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Coupon>, CheckoutError> {
    Ok(Json(state.coupons.coupon(&id).await?))
}

async fn get_coupon_expanded(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Coupon>, CheckoutError> {
    Ok(Json(state.coupons.coupon_expanded(&id).await?))
}

/// Endpoint: GET /promotion-codes?code=&coupon=&active=
async fn list_promotion_codes(
    State(state): State<SharedState>,
    filter: Result<Query<PromotionCodeFilter>, QueryRejection>,
) -> Result<Json<Vec<PromotionCode>>, CheckoutError> {
    let Query(filter) = filter?;
    Ok(Json(state.coupons.list_promotion_codes(&filter).await?))
}

async fn get_promotion_code(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PromotionCode>, CheckoutError> {
    Ok(Json(state.coupons.promotion_code(&id).await?))
}
