//! Coupon Query Module
//!
//! Read-only views of coupons and promotion codes, passed straight through
//! from the gateway.

pub mod handlers;

use crate::errors::CheckoutError;
use crate::gateway::models::{Coupon, PromotionCode, PromotionCodeFilter};
use crate::gateway::{CouponExpand, SharedGateway};

pub use handlers::routes;

#[derive(Clone)]
pub struct CouponQueries {
    gateway: SharedGateway,
}

impl CouponQueries {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }

    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, CheckoutError> {
        Ok(self.gateway.list_coupons().await?)
    }

    pub async fn coupon(&self, coupon_id: &str) -> Result<Coupon, CheckoutError> {
        Ok(self.gateway.coupon(coupon_id, CouponExpand::None).await?)
    }

    /// Coupon including its product restriction list
    pub async fn coupon_expanded(&self, coupon_id: &str) -> Result<Coupon, CheckoutError> {
        Ok(self.gateway.coupon(coupon_id, CouponExpand::AppliesTo).await?)
    }

    pub async fn list_promotion_codes(
        &self,
        filter: &PromotionCodeFilter,
    ) -> Result<Vec<PromotionCode>, CheckoutError> {
        Ok(self.gateway.list_promotion_codes(filter).await?)
    }

    pub async fn promotion_code(&self, id: &str) -> Result<PromotionCode, CheckoutError> {
        Ok(self.gateway.promotion_code(id).await?)
    }
}
