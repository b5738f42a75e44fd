//! Checkout Pricing Library
//!
//! This library prices shopping carts against a payment gateway, validates
//! coupons, and decides which payment flow a checkout should start.

// Domain modules
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod pricing;

// Infrastructure
pub mod config;
pub mod errors;
pub mod gateway;
pub mod router;
