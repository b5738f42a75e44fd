//! Checkout Domain Module
//!
//! This module contains the checkout flow, including:
//! - Request/response models (CheckoutInput, CheckoutResult)
//! - The orchestrator choosing between payment intents and discount sessions
//! - Application state management
//! - REST API handlers

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::CheckoutResult;
pub use orchestrator::CheckoutOrchestrator;
pub use state::{AppState, SharedState};
