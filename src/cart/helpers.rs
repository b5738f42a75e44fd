//! Shopping Cart Helpers
//!
//! This module contains helper functions for cart validation and formatting.

use super::models::CartItem;
use crate::errors::CheckoutError;

/// Rejects carts the engine cannot price: empty carts, zero quantities and
/// blank product ids.
pub fn validate_cart(items: &[CartItem]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::InvalidCart("cart is empty".to_string()));
    }

    for (index, item) in items.iter().enumerate() {
        if item.product_id.trim().is_empty() {
            return Err(CheckoutError::InvalidCart(format!(
                "item {} has no product id",
                index
            )));
        }
        if item.quantity == 0 {
            return Err(CheckoutError::InvalidCart(format!(
                "item {} ({}) must have a quantity of at least 1",
                index, item.product_id
            )));
        }
    }

    Ok(())
}

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x prod_apple, 1x prod_banana"`.
pub fn format_item_summary(items: &[CartItem]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.product_id))
        .collect::<Vec<_>>()
        .join(", ")
}
