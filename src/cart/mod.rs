//! Shopping Cart Domain Module
//!
//! This module contains the cart shape the pricing engine consumes:
//! - Domain models (CartItem)
//! - Helpers (cart validation, log summaries)

pub mod helpers;
pub mod models;

// Re-export commonly used types for convenience
pub use helpers::{format_item_summary, validate_cart};
pub use models::CartItem;
