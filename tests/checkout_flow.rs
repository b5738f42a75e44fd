//! Pricing and checkout flow tests against the in-memory sandbox gateway
//!
//! These tests cover:
//! - Cart totals with and without coupons
//! - Coupon rejections and where in the pricing loop they happen
//! - Payment flow selection (payment intent vs. discount session)
//! - Redemption counting on confirmation

mod common;

use checkout_pricing::cart::CartItem;
use checkout_pricing::checkout::CheckoutResult;
use checkout_pricing::errors::{CheckoutError, ErrorClass};
use checkout_pricing::gateway::models::{Coupon, PaymentIntentStatus};
use checkout_pricing::gateway::sandbox::DECLINED_PAYMENT_METHOD;
use checkout_pricing::gateway::{CouponExpand, PaymentGateway};
use chrono::{Duration, Utc};
use common::*;

fn cart(items: &[(&str, u32)]) -> Vec<CartItem> {
    items.iter().map(|(p, q)| CartItem::new(*p, *q)).collect()
}

async fn redemptions(gateway: &checkout_pricing::gateway::SandboxGateway, id: &str) -> u64 {
    gateway
        .coupon(id, CouponExpand::None)
        .await
        .unwrap()
        .redemption_count()
}

// =============================================================================
// Totals
// =============================================================================

#[tokio::test]
async fn test_total_without_coupon() {
    let gateway = seeded_gateway();
    let orchestrator = orchestrator(&gateway);

    let total = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 2)]), None)
        .await
        .unwrap();

    assert_eq!(total, 1000);
}

#[tokio::test]
async fn test_total_is_order_independent() {
    let gateway = seeded_gateway();
    let calculator = orchestrator(&gateway).calculator().clone();

    let forward = calculator
        .compute_total(&cart(&[("P1", 2), ("P2", 3)]), None)
        .await
        .unwrap();
    let backward = calculator
        .compute_total(&cart(&[("P2", 3), ("P1", 2)]), None)
        .await
        .unwrap();

    assert_eq!(forward, 2 * 500 + 3 * 1200);
    assert_eq!(forward, backward);
}

#[tokio::test]
async fn test_amount_off_coupon() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(amount_off("SAVE300", 300, &["P1"]));
    let orchestrator = orchestrator(&gateway);

    let total = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 2)]), Some("SAVE300"))
        .await
        .unwrap();

    assert_eq!(total, 700);
}

#[tokio::test]
async fn test_amount_off_applies_per_item_and_floors_at_zero() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(amount_off("SAVE800", 800, &[]));
    let orchestrator = orchestrator(&gateway);

    // P1: 500 - 800 -> 0, P2: 1200 - 800 -> 400
    let total = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 1), ("P2", 1)]), Some("SAVE800"))
        .await
        .unwrap();

    assert_eq!(total, 400);
}

#[tokio::test]
async fn test_percent_off_coupon_rounds_discount_down() {
    let gateway = seeded_gateway();
    gateway.insert_product("P3", "price_P3", 333);
    gateway.insert_coupon(percent_off("TENOFF", 10.0, &[]));
    let orchestrator = orchestrator(&gateway);

    // 10% of 333 is 33.3 -> 33 off
    let total = orchestrator
        .calculator()
        .compute_total(&cart(&[("P3", 1)]), Some("TENOFF"))
        .await
        .unwrap();

    assert_eq!(total, 300);
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_exhausted_coupon_fails_before_any_item_is_priced() {
    let gateway = seeded_gateway();
    let capped = Coupon {
        max_redemptions: Some(1),
        ..amount_off("ONCE", 100, &[])
    };
    gateway.insert_coupon(with_redemptions(capped, "1"));
    let orchestrator = orchestrator(&gateway);

    let err = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 1)]), Some("ONCE"))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::InvalidCoupon { .. }));
    assert!(gateway.price_lookups().await.is_empty());
}

#[tokio::test]
async fn test_expired_and_inactive_coupons_are_invalid() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(Coupon {
        redeem_by: Some(Utc::now() - Duration::days(1)),
        ..percent_off("OLD", 10.0, &[])
    });
    gateway.insert_coupon(Coupon {
        valid: false,
        ..percent_off("OFF", 10.0, &[])
    });
    let orchestrator = orchestrator(&gateway);

    for id in ["OLD", "OFF"] {
        let err = orchestrator
            .checkout(&cart(&[("P1", 1)]), Some(id))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidCoupon { .. }), "{id}");
        assert_eq!(err.class(), ErrorClass::Client);
    }
}

#[tokio::test]
async fn test_not_applicable_stops_at_first_excluded_item() {
    let gateway = seeded_gateway();
    gateway.insert_product("P3", "price_P3", 900);
    gateway.insert_coupon(amount_off("P1ONLY", 100, &["P1"]));
    let orchestrator = orchestrator(&gateway);

    let err = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 1), ("P2", 1), ("P3", 1)]), Some("P1ONLY"))
        .await
        .unwrap_err();

    match err {
        CheckoutError::NotApplicable { product_id, .. } => assert_eq!(product_id, "P2"),
        other => panic!("expected NotApplicable, got {other:?}"),
    }
    // P1 was priced first, P3 never reached
    assert_eq!(gateway.price_lookups().await, vec!["P1", "P2"]);
}

#[tokio::test]
async fn test_coupon_currency_must_match() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(Coupon {
        currency: Some("eur".to_string()),
        ..amount_off("EURO", 100, &[])
    });
    let orchestrator = orchestrator(&gateway);

    let err = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 1)]), Some("EURO"))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::CurrencyMismatch { .. }));
}

#[tokio::test]
async fn test_unknown_product_and_coupon_are_not_found() {
    let gateway = seeded_gateway();
    let orchestrator = orchestrator(&gateway);

    let err = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 1), ("NOPE", 1)]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::NotFound(_)));

    let err = orchestrator
        .calculator()
        .compute_total(&cart(&[("P1", 1)]), Some("MISSING"))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::NotFound(_)));
}

#[tokio::test]
async fn test_invalid_cart_is_rejected_before_gateway_calls() {
    let gateway = seeded_gateway();
    let orchestrator = orchestrator(&gateway);

    let err = orchestrator
        .checkout(&cart(&[("P1", 0)]), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::InvalidCart(_)));
    assert!(gateway.price_lookups().await.is_empty());
}

// =============================================================================
// Flow selection
// =============================================================================

#[tokio::test]
async fn test_checkout_without_coupon_creates_payment_intent() {
    let gateway = seeded_gateway();
    let orchestrator = orchestrator(&gateway);

    let result = orchestrator
        .checkout(&cart(&[("P1", 2)]), None)
        .await
        .unwrap();

    let CheckoutResult::PaymentIntent { id, client_secret } = result else {
        panic!("expected a payment intent");
    };
    assert!(!client_secret.is_empty());

    let intent = orchestrator.check_status(&id).await.unwrap();
    assert_eq!(intent.amount, 1000);
    assert_eq!(intent.currency, "usd");
}

#[tokio::test]
async fn test_partially_discounted_cart_still_uses_payment_intent() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(amount_off("SAVE300", 300, &["P1"]));
    let orchestrator = orchestrator(&gateway);

    let result = orchestrator
        .checkout(&cart(&[("P1", 2)]), Some("SAVE300"))
        .await
        .unwrap();

    let CheckoutResult::PaymentIntent { id, .. } = result else {
        panic!("expected a payment intent");
    };
    assert_eq!(orchestrator.check_status(&id).await.unwrap().amount, 700);
}

#[tokio::test]
async fn test_fully_discounted_cart_opens_checkout_session() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(percent_off("FREE", 100.0, &[]));
    let orchestrator = orchestrator(&gateway);

    let result = orchestrator
        .checkout(&cart(&[("P1", 2), ("P2", 1)]), Some("FREE"))
        .await
        .unwrap();

    let CheckoutResult::CheckoutSession { id, url } = result else {
        panic!("expected a checkout session");
    };
    assert!(url.contains(&id));

    let request = gateway.checkout_session_request(&id).unwrap();
    assert_eq!(request.coupon_id, "FREE");
    assert_eq!(request.line_items.len(), 2);
    assert_eq!(request.line_items[0].price, "price_P1");
    assert_eq!(request.line_items[0].quantity, 2);
    assert_eq!(request.line_items[1].price, "price_P2");
    assert_eq!(request.success_url, "http://localhost:8000/success");
}

#[tokio::test]
async fn test_zero_total_without_coupon_is_a_server_error() {
    let gateway = seeded_gateway();
    gateway.insert_product("FREEBIE", "price_FREEBIE", 0);
    let orchestrator = orchestrator(&gateway);

    let err = orchestrator
        .checkout(&cart(&[("FREEBIE", 1)]), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Gateway(_)));
    assert_eq!(err.class(), ErrorClass::Server);
}

// =============================================================================
// Confirmation and redemptions
// =============================================================================

#[tokio::test]
async fn test_successful_confirmation_increments_redemptions_once() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(with_redemptions(amount_off("SAVE300", 300, &[]), "4"));
    let orchestrator = orchestrator(&gateway);

    let CheckoutResult::PaymentIntent { id, .. } = orchestrator
        .checkout(&cart(&[("P1", 2)]), Some("SAVE300"))
        .await
        .unwrap()
    else {
        panic!("expected a payment intent");
    };

    let intent = orchestrator
        .confirm_payment(&id, Some("SAVE300"), None)
        .await
        .unwrap();

    assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
    assert_eq!(redemptions(&gateway, "SAVE300").await, 5);
}

#[tokio::test]
async fn test_failed_confirmation_leaves_redemptions_alone() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(amount_off("SAVE300", 300, &[]));
    let orchestrator = orchestrator(&gateway);

    let CheckoutResult::PaymentIntent { id, .. } = orchestrator
        .checkout(&cart(&[("P1", 2)]), Some("SAVE300"))
        .await
        .unwrap()
    else {
        panic!("expected a payment intent");
    };

    let intent = orchestrator
        .confirm_payment(&id, Some("SAVE300"), Some(DECLINED_PAYMENT_METHOD))
        .await
        .unwrap();

    assert_eq!(intent.status, PaymentIntentStatus::RequiresPaymentMethod);
    assert_eq!(redemptions(&gateway, "SAVE300").await, 0);
}

#[tokio::test]
async fn test_check_status_does_not_change_state() {
    let gateway = seeded_gateway();
    let orchestrator = orchestrator(&gateway);

    let intent = gateway.create_payment_intent(1500, "usd").await.unwrap();

    let first = orchestrator.check_status(&intent.id).await.unwrap();
    let second = orchestrator.check_status(&intent.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.status, PaymentIntentStatus::RequiresConfirmation);
}

#[tokio::test]
async fn test_confirming_unknown_intent_is_not_found() {
    let gateway = seeded_gateway();
    let orchestrator = orchestrator(&gateway);

    let err = orchestrator
        .confirm_payment("pi_missing", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirmations_do_not_lose_redemptions() {
    let gateway = seeded_gateway();
    gateway.insert_coupon(amount_off("RUSH", 100, &[]));
    let orchestrator = orchestrator(&gateway);

    let mut intents = Vec::new();
    for _ in 0..20 {
        intents.push(gateway.create_payment_intent(900, "usd").await.unwrap().id);
    }

    let handles: Vec<_> = intents
        .into_iter()
        .map(|id| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.confirm_payment(&id, Some("RUSH"), None).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(redemptions(&gateway, "RUSH").await, 20);
}
