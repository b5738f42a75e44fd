//! In-memory sandbox gateway
//!
//! Behaves like a test-mode payment gateway without leaving the process.
//! Used when no Stripe key is configured and throughout the test suite.

use super::{models::*, CouponExpand, PaymentGateway};
use crate::errors::GatewayError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Payment method that the sandbox always declines
pub const DECLINED_PAYMENT_METHOD: &str = "pm_card_chargeDeclined";

/// In-memory gateway state.
/// DashMap allows concurrent access without external Mutexes.
#[derive(Default)]
pub struct SandboxGateway {
    /// Active price per product id
    prices: DashMap<String, Price>,
    coupons: DashMap<String, Coupon>,
    promotion_codes: DashMap<String, PromotionCode>,
    payment_intents: DashMap<String, PaymentIntent>,
    checkout_sessions: DashMap<String, CheckoutSessionRequest>,
    /// Product ids in the order their unit price was requested
    price_lookups: Mutex<Vec<String>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product with an active price.
    pub fn insert_product(&self, product_id: &str, price_id: &str, unit_amount: u64) {
        self.prices.insert(
            product_id.to_string(),
            Price {
                id: price_id.to_string(),
                unit_amount: Some(unit_amount),
            },
        );
    }

    pub fn insert_coupon(&self, coupon: Coupon) {
        self.coupons.insert(coupon.id.clone(), coupon);
    }

    pub fn insert_promotion_code(&self, promo: PromotionCode) {
        self.promotion_codes.insert(promo.id.clone(), promo);
    }

    /// Product ids whose unit price has been looked up, oldest first.
    pub async fn price_lookups(&self) -> Vec<String> {
        self.price_lookups.lock().await.clone()
    }

    /// The request a hosted session was created from.
    pub fn checkout_session_request(&self, session_id: &str) -> Option<CheckoutSessionRequest> {
        self.checkout_sessions.get(session_id).map(|r| r.clone())
    }

    fn active_price(&self, product_id: &str) -> Result<Price, GatewayError> {
        self.prices
            .get(product_id)
            .map(|p| p.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("Price for product {}", product_id)))
    }

    fn mint_id(prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn unit_price(&self, product_id: &str) -> Result<u64, GatewayError> {
        self.price_lookups.lock().await.push(product_id.to_string());
        self.active_price(product_id)?
            .unit_amount
            .ok_or_else(|| GatewayError::NotFound(format!("Price for product {}", product_id)))
    }

    async fn price_reference(&self, product_id: &str) -> Result<String, GatewayError> {
        Ok(self.active_price(product_id)?.id)
    }

    async fn coupon(&self, coupon_id: &str, expand: CouponExpand) -> Result<Coupon, GatewayError> {
        let mut coupon = self
            .coupons
            .get(coupon_id)
            .map(|c| c.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("Coupon {}", coupon_id)))?;

        if expand == CouponExpand::None {
            coupon.applies_to = None;
        }
        Ok(coupon)
    }

    async fn update_coupon_metadata(
        &self,
        coupon_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), GatewayError> {
        let mut coupon = self
            .coupons
            .get_mut(coupon_id)
            .ok_or_else(|| GatewayError::NotFound(format!("Coupon {}", coupon_id)))?;
        coupon.metadata.extend(metadata);
        Ok(())
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, GatewayError> {
        let mut coupons: Vec<Coupon> = self
            .coupons
            .iter()
            .map(|entry| {
                let mut coupon = entry.value().clone();
                coupon.applies_to = None;
                coupon
            })
            .collect();
        coupons.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(coupons)
    }

    async fn promotion_code(&self, id: &str) -> Result<PromotionCode, GatewayError> {
        self.promotion_codes
            .get(id)
            .map(|p| p.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("Promotion code {}", id)))
    }

    async fn list_promotion_codes(
        &self,
        filter: &PromotionCodeFilter,
    ) -> Result<Vec<PromotionCode>, GatewayError> {
        let mut codes: Vec<PromotionCode> = self
            .promotion_codes
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        codes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(codes)
    }

    async fn create_payment_intent(
        &self,
        amount: u64,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        if amount == 0 {
            return Err(GatewayError::Rejected(
                "amount must be at least 1 minor unit".to_string(),
            ));
        }

        let id = Self::mint_id("pi");
        let intent = PaymentIntent {
            client_secret: Some(format!("{}_secret_{}", id, Uuid::new_v4().simple())),
            id: id.clone(),
            status: PaymentIntentStatus::RequiresConfirmation,
            amount,
            currency: currency.to_ascii_lowercase(),
        };
        self.payment_intents.insert(id, intent.clone());
        Ok(intent)
    }

    async fn confirm_payment_intent(
        &self,
        id: &str,
        payment_method: &str,
        _return_url: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut intent = self
            .payment_intents
            .get_mut(id)
            .ok_or_else(|| GatewayError::NotFound(format!("Payment intent {}", id)))?;

        intent.status = if payment_method == DECLINED_PAYMENT_METHOD {
            PaymentIntentStatus::RequiresPaymentMethod
        } else {
            PaymentIntentStatus::Succeeded
        };
        Ok(intent.clone())
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError> {
        self.payment_intents
            .get(id)
            .map(|i| i.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("Payment intent {}", id)))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        if !self.coupons.contains_key(&request.coupon_id) {
            return Err(GatewayError::NotFound(format!(
                "Coupon {}",
                request.coupon_id
            )));
        }

        let id = Self::mint_id("cs");
        let url = format!("https://checkout.sandbox.local/c/pay/{}", id);
        self.checkout_sessions.insert(id.clone(), request.clone());
        Ok(CheckoutSession { id, url: Some(url) })
    }
}
