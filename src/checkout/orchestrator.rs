//! Checkout orchestration
//!
//! Chooses between a direct payment intent and a hosted discount session,
//! and records coupon redemptions once a confirmed payment succeeds.

use super::models::CheckoutResult;
use crate::cart::{format_item_summary, CartItem};
use crate::config::CheckoutSettings;
use crate::errors::CheckoutError;
use crate::gateway::models::{
    CheckoutSessionRequest, PaymentIntent, PaymentIntentStatus, SessionLineItem,
};
use crate::gateway::SharedGateway;
use crate::pricing::{CatalogPriceLookup, CouponValidator, PricingCalculator};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CheckoutOrchestrator {
    gateway: SharedGateway,
    catalog: CatalogPriceLookup,
    validator: CouponValidator,
    calculator: PricingCalculator,
    settings: CheckoutSettings,
}

impl CheckoutOrchestrator {
    pub fn new(gateway: SharedGateway, settings: CheckoutSettings) -> Self {
        let catalog = CatalogPriceLookup::new(gateway.clone());
        let validator = CouponValidator::new(gateway.clone());
        let calculator =
            PricingCalculator::new(catalog.clone(), validator.clone(), settings.currency.clone());

        Self {
            gateway,
            catalog,
            validator,
            calculator,
            settings,
        }
    }

    pub fn calculator(&self) -> &PricingCalculator {
        &self.calculator
    }

    pub fn validator(&self) -> &CouponValidator {
        &self.validator
    }

    /// Prices the cart and starts the matching payment flow.
    ///
    /// A zero total with a coupon cannot be charged directly, so it is
    /// redeemed through a hosted session that carries the coupon instead.
    #[instrument(skip(self, items), fields(items = %format_item_summary(items)))]
    pub async fn checkout(
        &self,
        items: &[CartItem],
        coupon_id: Option<&str>,
    ) -> Result<CheckoutResult, CheckoutError> {
        let total = self.calculator.compute_total(items, coupon_id).await?;

        if let (0, Some(coupon_id)) = (total, coupon_id) {
            return self.start_discount_session(items, coupon_id).await;
        }

        let intent = self
            .gateway
            .create_payment_intent(total, &self.settings.currency)
            .await?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            CheckoutError::Validation(format!("payment intent {} has no client secret", intent.id))
        })?;

        info!(payment_intent_id = %intent.id, total, "payment intent created");
        Ok(CheckoutResult::PaymentIntent {
            id: intent.id,
            client_secret,
        })
    }

    async fn start_discount_session(
        &self,
        items: &[CartItem],
        coupon_id: &str,
    ) -> Result<CheckoutResult, CheckoutError> {
        let mut line_items = Vec::with_capacity(items.len());
        for item in items {
            line_items.push(SessionLineItem {
                price: self.catalog.price_reference(&item.product_id).await?,
                quantity: item.quantity,
            });
        }

        let request = CheckoutSessionRequest {
            line_items,
            coupon_id: coupon_id.to_string(),
            success_url: self.settings.success_url.clone(),
            cancel_url: self.settings.cancel_url.clone(),
        };
        let session = self.gateway.create_checkout_session(&request).await?;
        let url = session.url.ok_or_else(|| {
            CheckoutError::Validation(format!("checkout session {} has no url", session.id))
        })?;

        info!(session_id = %session.id, coupon_id, "discount checkout session created");
        Ok(CheckoutResult::CheckoutSession {
            id: session.id,
            url,
        })
    }

    /// Confirms the intent with the simulated payment method and, on success,
    /// records one redemption of `coupon_id`. Repeated confirmations of the
    /// same intent record repeated redemptions.
    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        payment_intent_id: &str,
        coupon_id: Option<&str>,
        payment_method: Option<&str>,
    ) -> Result<PaymentIntent, CheckoutError> {
        let method = payment_method.unwrap_or(self.settings.confirm_payment_method.as_str());
        let intent = self
            .gateway
            .confirm_payment_intent(payment_intent_id, method, &self.settings.return_url)
            .await?;

        info!(payment_intent_id, status = ?intent.status, "payment intent confirmed");

        if intent.status == PaymentIntentStatus::Succeeded {
            if let Some(coupon_id) = coupon_id {
                self.validator.increment_redemption(coupon_id).await?;
            }
        }

        Ok(intent)
    }

    /// Current state of a payment intent. Never mutates anything.
    pub async fn check_status(&self, payment_intent_id: &str) -> Result<PaymentIntent, CheckoutError> {
        Ok(self.gateway.retrieve_payment_intent(payment_intent_id).await?)
    }
}
