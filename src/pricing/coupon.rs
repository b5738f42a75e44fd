//! Coupon validation and discount arithmetic
//!
//! General validity (active, unexpired, under its redemption cap) is a
//! property of the coupon. Applicability and currency are checked per product,
//! so they use a separate expanded fetch.

use crate::errors::{CheckoutError, GatewayError};
use crate::gateway::models::{Coupon, REDEMPTION_COUNT_KEY};
use crate::gateway::{CouponExpand, SharedGateway};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, warn};

// =============================================================================
// Pure rules
// =============================================================================

/// True when the coupon carries no currency restriction or its restriction is `currency`.
pub fn currency_matches(coupon: &Coupon, currency: &str) -> bool {
    coupon
        .currency
        .as_deref()
        .map_or(true, |c| c.eq_ignore_ascii_case(currency))
}

/// Applies the coupon to an item total. Amount-off wins over percent-off; the
/// result never drops below zero.
pub fn apply_discount(item_total: u64, coupon: &Coupon) -> u64 {
    if let Some(amount_off) = coupon.amount_off {
        return item_total.saturating_sub(amount_off);
    }

    if let Some(percent_off) = coupon.percent_off {
        let basis_points = u128::from(percent_basis_points(percent_off));
        // floor(total * bp / 10_000) fits in u64 because bp <= 10_000
        let discount = (u128::from(item_total) * basis_points / 10_000) as u64;
        return item_total.saturating_sub(discount);
    }

    item_total
}

/// Percent-off as hundredths of a percent, clamped to 0..=10_000. The gateway
/// allows at most two decimals, so rounding only removes float noise.
fn percent_basis_points(percent_off: f64) -> u64 {
    if !percent_off.is_finite() || percent_off <= 0.0 {
        return 0;
    }
    (percent_off * 100.0).round().min(10_000.0) as u64
}

/// Checks the coupon-level business rules at instant `now`.
pub fn ensure_generally_valid(coupon: &Coupon, now: DateTime<Utc>) -> Result<(), CheckoutError> {
    let reject = |reason: &str| CheckoutError::InvalidCoupon {
        coupon_id: coupon.id.clone(),
        reason: reason.to_string(),
    };

    if !coupon.valid {
        return Err(reject("coupon is no longer active"));
    }

    if let Some(redeem_by) = coupon.redeem_by {
        if redeem_by < now {
            return Err(reject("coupon has expired"));
        }
    }

    if let Some(max) = coupon.max_redemptions {
        if coupon.redemption_count() >= max {
            return Err(reject("coupon has reached its maximum redemptions"));
        }
    }

    Ok(())
}

/// Checks the coupon's product restriction. No restriction means every product qualifies.
pub fn ensure_applies_to(coupon: &Coupon, product_id: &str) -> Result<(), CheckoutError> {
    match &coupon.applies_to {
        Some(applies_to) if !applies_to.products.iter().any(|p| p == product_id) => {
            Err(CheckoutError::NotApplicable {
                coupon_id: coupon.id.clone(),
                product_id: product_id.to_string(),
            })
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Redemption serialization
// =============================================================================

/// Per-coupon async locks serializing redemption read-modify-writes within
/// this process. The gateway offers no compare-and-swap, so increments from
/// other processes can still race.
#[derive(Default)]
pub struct RedemptionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RedemptionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, coupon_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await.
        let lock = self
            .locks
            .entry(coupon_id.to_string())
            .or_default()
            .value()
            .clone();
        lock.lock_owned().await
    }
}

// =============================================================================
// Validator
// =============================================================================

#[derive(Clone)]
pub struct CouponValidator {
    gateway: SharedGateway,
    redemption_locks: Arc<RedemptionLocks>,
}

impl CouponValidator {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            redemption_locks: Arc::new(RedemptionLocks::new()),
        }
    }

    /// Classifies a failed coupon fetch: a missing coupon stays `NotFound`,
    /// anything else is an infrastructure fault.
    fn lookup_failure(coupon_id: &str, err: GatewayError) -> CheckoutError {
        match err {
            GatewayError::NotFound(what) => CheckoutError::NotFound(what),
            other => {
                error!(coupon_id, error = %other, "coupon lookup failed");
                CheckoutError::Validation(format!("failed to validate coupon {}", coupon_id))
            }
        }
    }

    /// Fetches the coupon and enforces the coupon-level rules, returning the
    /// record so callers price against the same snapshot.
    pub async fn check_general_validity(&self, coupon_id: &str) -> Result<Coupon, CheckoutError> {
        let coupon = self
            .gateway
            .coupon(coupon_id, CouponExpand::None)
            .await
            .map_err(|e| Self::lookup_failure(coupon_id, e))?;

        if let Err(rejection) = ensure_generally_valid(&coupon, Utc::now()) {
            warn!(coupon_id, reason = %rejection, "coupon rejected");
            return Err(rejection);
        }

        Ok(coupon)
    }

    /// Checks the coupon's product restriction with an expanded fetch.
    pub async fn check_applies_to_product(
        &self,
        coupon_id: &str,
        product_id: &str,
    ) -> Result<(), CheckoutError> {
        let coupon = self
            .gateway
            .coupon(coupon_id, CouponExpand::AppliesTo)
            .await
            .map_err(|e| Self::lookup_failure(coupon_id, e))?;

        ensure_applies_to(&coupon, product_id).map_err(|rejection| {
            warn!(coupon_id, product_id, "coupon not applicable to product");
            rejection
        })
    }

    /// Adds one to the coupon's redemption counter and returns the new count.
    pub async fn increment_redemption(&self, coupon_id: &str) -> Result<u64, CheckoutError> {
        let _guard = self.redemption_locks.acquire(coupon_id).await;

        let coupon = self
            .gateway
            .coupon(coupon_id, CouponExpand::None)
            .await
            .map_err(|e| {
                error!(coupon_id, error = %e, "failed to read redemption count");
                CheckoutError::Validation(format!("failed to read redemptions for {}", coupon_id))
            })?;

        let next = coupon.redemption_count() + 1;
        let metadata = HashMap::from([(REDEMPTION_COUNT_KEY.to_string(), next.to_string())]);

        self.gateway
            .update_coupon_metadata(coupon_id, metadata)
            .await
            .map_err(|e| {
                error!(coupon_id, error = %e, "failed to write redemption count");
                CheckoutError::Validation(format!("failed to record redemption for {}", coupon_id))
            })?;

        info!(coupon_id, redemptions = next, "coupon redemption recorded");
        Ok(next)
    }
}
