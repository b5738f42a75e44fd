//! Gateway Data Models
//!
//! Shapes of the records the payment gateway owns. Field names follow the
//! gateway's wire format so the same types decode REST responses directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key holding a coupon's redemption counter.
pub const REDEMPTION_COUNT_KEY: &str = "timesRedeemed";

// =============================================================================
// Coupons
// =============================================================================

/// Product restriction attached to a coupon (only present on expanded fetches)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppliesTo {
    #[serde(default)]
    pub products: Vec<String>,
}

/// A gateway-held discount rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Gateway's own validity flag
    pub valid: bool,

    /// Expiry; stored by the gateway as unix seconds
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub redeem_by: Option<DateTime<Utc>>,

    #[serde(default)]
    pub max_redemptions: Option<u64>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Currency restriction for amount-off coupons
    #[serde(default)]
    pub currency: Option<String>,

    /// Fixed discount in minor currency units
    #[serde(default)]
    pub amount_off: Option<u64>,

    /// Percentage discount, 0 to 100
    #[serde(default)]
    pub percent_off: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<AppliesTo>,
}

impl Coupon {
    /// Redemption count from metadata; missing or unparsable values count as zero.
    pub fn redemption_count(&self) -> u64 {
        self.metadata
            .get(REDEMPTION_COUNT_KEY)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Customer-facing code mapping to a coupon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionCode {
    pub id: String,
    pub code: String,
    pub active: bool,
    pub coupon: Coupon,

    #[serde(default)]
    pub max_redemptions: Option<u64>,

    #[serde(default)]
    pub times_redeemed: u64,

    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Optional filters for listing promotion codes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionCodeFilter {
    pub code: Option<String>,
    pub coupon: Option<String>,
    pub active: Option<bool>,
}

impl PromotionCodeFilter {
    pub fn matches(&self, promo: &PromotionCode) -> bool {
        self.code.as_deref().map_or(true, |c| promo.code == c)
            && self.coupon.as_deref().map_or(true, |c| promo.coupon.id == c)
            && self.active.map_or(true, |a| promo.active == a)
    }
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

/// A single-charge payment lifecycle object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
    pub amount: u64,
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// One line of a hosted checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLineItem {
    /// Gateway-native price reference
    pub price: String,
    pub quantity: u32,
}

/// Everything needed to open a hosted discount checkout
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub line_items: Vec<SessionLineItem>,
    pub coupon_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted, redirect-based payment flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSession {
    pub id: String,

    #[serde(default)]
    pub url: Option<String>,
}

/// Envelope for list endpoints. `has_more` means another page follows the
/// last element of `data`.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

/// Catalog price record
#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub id: String,

    #[serde(default)]
    pub unit_amount: Option<u64>,
}
