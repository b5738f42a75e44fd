//! Shared fixtures for integration tests

#![allow(dead_code)]

use checkout_pricing::checkout::{AppState, CheckoutOrchestrator};
use checkout_pricing::config::CheckoutSettings;
use checkout_pricing::gateway::models::{AppliesTo, Coupon, REDEMPTION_COUNT_KEY};
use checkout_pricing::gateway::{SandboxGateway, SharedGateway};
use std::collections::HashMap;
use std::sync::Arc;

/// Sandbox with two products: P1 at 500 and P2 at 1200.
pub fn seeded_gateway() -> Arc<SandboxGateway> {
    let gateway = SandboxGateway::new();
    gateway.insert_product("P1", "price_P1", 500);
    gateway.insert_product("P2", "price_P2", 1200);
    Arc::new(gateway)
}

pub fn orchestrator(gateway: &Arc<SandboxGateway>) -> CheckoutOrchestrator {
    let shared: SharedGateway = gateway.clone();
    CheckoutOrchestrator::new(shared, CheckoutSettings::default())
}

pub fn app_state(gateway: &Arc<SandboxGateway>) -> Arc<AppState> {
    let shared: SharedGateway = gateway.clone();
    Arc::new(AppState::new(shared, CheckoutSettings::default()))
}

pub fn coupon(id: &str) -> Coupon {
    Coupon {
        id: id.to_string(),
        name: None,
        valid: true,
        redeem_by: None,
        max_redemptions: None,
        metadata: HashMap::new(),
        currency: None,
        amount_off: None,
        percent_off: None,
        applies_to: None,
    }
}

pub fn amount_off(id: &str, amount: u64, products: &[&str]) -> Coupon {
    Coupon {
        amount_off: Some(amount),
        currency: Some("usd".to_string()),
        applies_to: restrict(products),
        ..coupon(id)
    }
}

pub fn percent_off(id: &str, percent: f64, products: &[&str]) -> Coupon {
    Coupon {
        percent_off: Some(percent),
        applies_to: restrict(products),
        ..coupon(id)
    }
}

pub fn with_redemptions(mut coupon: Coupon, redeemed: &str) -> Coupon {
    coupon
        .metadata
        .insert(REDEMPTION_COUNT_KEY.to_string(), redeemed.to_string());
    coupon
}

fn restrict(products: &[&str]) -> Option<AppliesTo> {
    if products.is_empty() {
        None
    } else {
        Some(AppliesTo {
            products: products.iter().map(|p| p.to_string()).collect(),
        })
    }
}
