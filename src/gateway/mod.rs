//! Payment Gateway Module
//!
//! The gateway is the source of truth for prices, coupons and payments.
//! The pricing engine only sees the `PaymentGateway` capability set:
//! - `StripeGateway` talks to the Stripe REST API
//! - `SandboxGateway` keeps everything in memory for local runs and tests

pub mod models;
pub mod sandbox;
pub mod stripe;

use crate::errors::GatewayError;
use async_trait::async_trait;
use models::*;
use std::collections::HashMap;
use std::sync::Arc;

pub use sandbox::SandboxGateway;
pub use stripe::StripeGateway;

/// Shared handle to a gateway implementation
pub type SharedGateway = Arc<dyn PaymentGateway>;

/// Whether a coupon fetch should include its product restriction list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponExpand {
    None,
    AppliesTo,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Unit price of the product's active price, in minor units
    async fn unit_price(&self, product_id: &str) -> Result<u64, GatewayError>;

    /// Identifier of the product's active price
    async fn price_reference(&self, product_id: &str) -> Result<String, GatewayError>;

    async fn coupon(&self, coupon_id: &str, expand: CouponExpand) -> Result<Coupon, GatewayError>;

    async fn update_coupon_metadata(
        &self,
        coupon_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), GatewayError>;

    async fn list_coupons(&self) -> Result<Vec<Coupon>, GatewayError>;

    async fn promotion_code(&self, id: &str) -> Result<PromotionCode, GatewayError>;

    async fn list_promotion_codes(
        &self,
        filter: &PromotionCodeFilter,
    ) -> Result<Vec<PromotionCode>, GatewayError>;

    async fn create_payment_intent(
        &self,
        amount: u64,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError>;

    async fn confirm_payment_intent(
        &self,
        id: &str,
        payment_method: &str,
        return_url: &str,
    ) -> Result<PaymentIntent, GatewayError>;

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;
}
