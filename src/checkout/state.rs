//! Application State
//!
//! Components are built once around an injected gateway and shared by every
//! request; none of them holds request-scoped mutable data.

use super::orchestrator::CheckoutOrchestrator;
use crate::config::CheckoutSettings;
use crate::coupons::CouponQueries;
use crate::gateway::SharedGateway;
use std::sync::Arc;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub orchestrator: CheckoutOrchestrator,
    pub coupons: CouponQueries,
}

impl AppState {
    pub fn new(gateway: SharedGateway, settings: CheckoutSettings) -> Self {
        Self {
            orchestrator: CheckoutOrchestrator::new(gateway.clone(), settings),
            coupons: CouponQueries::new(gateway),
        }
    }
}
