//! Catalog price lookup
//!
//! Every call is a fresh gateway round-trip; prices are never cached.

use crate::errors::CheckoutError;
use crate::gateway::SharedGateway;

#[derive(Clone)]
pub struct CatalogPriceLookup {
    gateway: SharedGateway,
}

impl CatalogPriceLookup {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }

    /// Unit price in minor currency units. `NotFound` when the product has no active price.
    pub async fn unit_price(&self, product_id: &str) -> Result<u64, CheckoutError> {
        Ok(self.gateway.unit_price(product_id).await?)
    }

    /// Gateway-native price reference, needed to build hosted sessions.
    pub async fn price_reference(&self, product_id: &str) -> Result<String, CheckoutError> {
        Ok(self.gateway.price_reference(product_id).await?)
    }
}
