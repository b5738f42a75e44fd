//! Cart total computation
//!
//! Coupon validity is checked once per cart; currency and applicability are
//! checked per item. Items are priced strictly in order and the first failure
//! aborts the computation without a partial total.

use super::{apply_discount, currency_matches, CatalogPriceLookup, CouponValidator};
use crate::cart::{validate_cart, CartItem};
use crate::errors::CheckoutError;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct PricingCalculator {
    catalog: CatalogPriceLookup,
    validator: CouponValidator,
    /// Transaction currency coupons must be compatible with
    currency: String,
}

impl PricingCalculator {
    pub fn new(
        catalog: CatalogPriceLookup,
        validator: CouponValidator,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            validator,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Total payable amount for `items`, in minor currency units.
    pub async fn compute_total(
        &self,
        items: &[CartItem],
        coupon_id: Option<&str>,
    ) -> Result<u64, CheckoutError> {
        validate_cart(items)?;

        let coupon = match coupon_id {
            Some(id) => Some(self.validator.check_general_validity(id).await?),
            None => None,
        };

        let mut total: u64 = 0;
        for item in items {
            let unit_price = self.catalog.unit_price(&item.product_id).await?;
            let mut item_total = unit_price
                .checked_mul(u64::from(item.quantity))
                .ok_or_else(|| overflow(&item.product_id))?;

            if let (Some(coupon), Some(coupon_id)) = (&coupon, coupon_id) {
                if !currency_matches(coupon, &self.currency) {
                    warn!(coupon_id, currency = %self.currency, "coupon currency mismatch");
                    return Err(CheckoutError::CurrencyMismatch {
                        coupon_id: coupon_id.to_string(),
                        currency: self.currency.clone(),
                    });
                }
                self.validator
                    .check_applies_to_product(coupon_id, &item.product_id)
                    .await?;
                item_total = apply_discount(item_total, coupon);
            }

            debug!(
                product_id = %item.product_id,
                quantity = item.quantity,
                unit_price,
                item_total,
                "priced cart item"
            );
            total = total
                .checked_add(item_total)
                .ok_or_else(|| overflow(&item.product_id))?;
        }

        Ok(total)
    }
}

fn overflow(product_id: &str) -> CheckoutError {
    CheckoutError::Validation(format!("amount overflow while pricing {}", product_id))
}
