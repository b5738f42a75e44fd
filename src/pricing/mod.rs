//! Pricing Module
//!
//! The decision core of checkout:
//! - Catalog price lookup (unit prices and gateway price references)
//! - Coupon validation, discount arithmetic and redemption counting
//! - Cart total computation

pub mod calculator;
pub mod catalog;
pub mod coupon;

pub use calculator::PricingCalculator;
pub use catalog::CatalogPriceLookup;
pub use coupon::{apply_discount, currency_matches, CouponValidator, RedemptionLocks};
