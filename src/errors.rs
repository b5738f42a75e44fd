//! Error taxonomy for pricing and checkout
//!
//! `GatewayError` describes faults talking to the payment gateway.
//! `CheckoutError` is what every core operation returns; it separates
//! business rejections (client class) from infrastructure faults (server class).

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Faults raised by a `PaymentGateway` implementation.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("gateway error: status={status} type={error_type:?} message={message:?}")]
    Api {
        status: u16,
        error_type: Option<String>,
        message: Option<String>,
    },

    #[error("rejected by gateway: {0}")]
    Rejected(String),
}

/// Errors surfaced by the pricing engine and checkout orchestrator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Coupon {coupon_id} is not valid: {reason}")]
    InvalidCoupon { coupon_id: String, reason: String },

    #[error("Coupon {coupon_id} does not apply to product {product_id}")]
    NotApplicable {
        coupon_id: String,
        product_id: String,
    },

    #[error("Coupon {coupon_id} cannot be used with currency {currency}")]
    CurrencyMismatch { coupon_id: String, currency: String },

    #[error("Invalid cart: {0}")]
    InvalidCart(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Gateway error: {0}")]
    Gateway(GatewayError),
}

/// Whether an error is the caller's fault or ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    Client,
    Server,
}

impl CheckoutError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CheckoutError::NotFound(_)
            | CheckoutError::InvalidCoupon { .. }
            | CheckoutError::NotApplicable { .. }
            | CheckoutError::CurrencyMismatch { .. }
            | CheckoutError::InvalidCart(_)
            | CheckoutError::InvalidRequest(_) => ErrorClass::Client,
            CheckoutError::Validation(_) | CheckoutError::Gateway(_) => ErrorClass::Server,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::NotFound(_) => "not_found",
            CheckoutError::InvalidCoupon { .. } => "invalid_coupon",
            CheckoutError::NotApplicable { .. } => "not_applicable",
            CheckoutError::CurrencyMismatch { .. } => "currency_mismatch",
            CheckoutError::InvalidCart(_) => "invalid_cart",
            CheckoutError::InvalidRequest(_) => "invalid_request",
            CheckoutError::Validation(_) => "validation_error",
            CheckoutError::Gateway(_) => "gateway_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::NotFound(_) => StatusCode::NOT_FOUND,
            CheckoutError::InvalidCoupon { .. }
            | CheckoutError::InvalidCart(_)
            | CheckoutError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CheckoutError::NotApplicable { .. } | CheckoutError::CurrencyMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CheckoutError::Validation(_) | CheckoutError::Gateway(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the caller. Server faults never leak gateway detail.
    pub fn public_message(&self) -> String {
        match self.class() {
            ErrorClass::Client => self.to_string(),
            ErrorClass::Server => "Internal server error".to_string(),
        }
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => CheckoutError::NotFound(what),
            other => {
                tracing::error!(error = %other, "gateway fault");
                CheckoutError::Gateway(other)
            }
        }
    }
}

// Malformed bodies and query strings get the same envelope as every other
// client error instead of axum's plain-text rejection.
impl From<JsonRejection> for CheckoutError {
    fn from(rejection: JsonRejection) -> Self {
        CheckoutError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for CheckoutError {
    fn from(rejection: QueryRejection) -> Self {
        CheckoutError::InvalidRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub class: ErrorClass,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                class: self.class(),
                code: self.code(),
                message: self.public_message(),
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}
