//! Checkout Request and Response Models

use crate::cart::CartItem;
use serde::{Deserialize, Serialize};

/// Body of `POST /checkout`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    /// Items to price, in order
    pub items: Vec<CartItem>,

    /// Optional coupon to apply
    pub coupon_id: Option<String>,
}

/// Body of `POST /payments/confirm`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentInput {
    pub payment_intent_id: String,

    /// Coupon whose redemption count is bumped on success
    pub coupon_id: Option<String>,

    /// Overrides the configured simulated payment method
    pub payment_method: Option<String>,
}

/// Which payment flow checkout started
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CheckoutResult {
    /// Direct charge; the client confirms it with the secret
    PaymentIntent { id: String, client_secret: String },

    /// Fully discounted cart redeemed through a hosted session
    CheckoutSession { id: String, url: String },
}
