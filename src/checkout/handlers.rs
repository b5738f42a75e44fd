//! REST API handlers for checkout and payment operations

use super::{models::*, state::SharedState};
use crate::errors::CheckoutError;
use crate::gateway::models::PaymentIntent;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};

/// Creates routes for checkout-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/payments/confirm", post(confirm_payment))
        .route("/payments/:id", get(payment_status))
}

/// Endpoint: POST /checkout
/// Prices the cart and starts either a payment intent or a discount session.
async fn checkout(
    State(state): State<SharedState>,
    payload: Result<Json<CheckoutInput>, JsonRejection>,
) -> Result<Json<CheckoutResult>, CheckoutError> {
    let Json(payload) = payload?;
    let result = state
        .orchestrator
        .checkout(&payload.items, payload.coupon_id.as_deref())
        .await?;
    Ok(Json(result))
}

/// Endpoint: POST /payments/confirm
async fn confirm_payment(
    State(state): State<SharedState>,
    payload: Result<Json<ConfirmPaymentInput>, JsonRejection>,
) -> Result<Json<PaymentIntent>, CheckoutError> {
    let Json(payload) = payload?;
    let intent = state
        .orchestrator
        .confirm_payment(
            &payload.payment_intent_id,
            payload.coupon_id.as_deref(),
            payload.payment_method.as_deref(),
        )
        .await?;
    Ok(Json(intent))
}

/// Endpoint: GET /payments/:id
async fn payment_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentIntent>, CheckoutError> {
    Ok(Json(state.orchestrator.check_status(&id).await?))
}
