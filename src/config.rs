//! Runtime configuration
//!
//! Values come from the environment (optionally seeded from a `.env` file),
//! each with a default suitable for local development.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Settings consumed by the checkout orchestrator.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Transaction currency, lowercase ISO code
    pub currency: String,
    /// Redirect after a hosted discount session completes
    pub success_url: String,
    /// Redirect when the customer abandons a hosted session
    pub cancel_url: String,
    /// Return URL handed to the gateway when confirming a payment intent
    pub return_url: String,
    /// Payment method used to simulate confirmation when the caller supplies none
    pub confirm_payment_method: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            success_url: "http://localhost:8000/success".to_string(),
            cancel_url: "http://localhost:8000/cancel".to_string(),
            return_url: "http://localhost:8000/return".to_string(),
            confirm_payment_method: "pm_card_visa".to_string(),
        }
    }
}

/// Connection settings for the Stripe REST gateway.
#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub secret_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub checkout: CheckoutSettings,
    /// `None` runs the service against the in-memory sandbox gateway
    pub stripe: Option<StripeSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            checkout: CheckoutSettings::default(),
            stripe: None,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let checkout_defaults = defaults.checkout;

        let port = match lookup("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: v })?,
            None => defaults.port,
        };

        let checkout = CheckoutSettings {
            currency: lookup("CHECKOUT_CURRENCY")
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or(checkout_defaults.currency),
            success_url: lookup("CHECKOUT_SUCCESS_URL").unwrap_or(checkout_defaults.success_url),
            cancel_url: lookup("CHECKOUT_CANCEL_URL").unwrap_or(checkout_defaults.cancel_url),
            return_url: lookup("PAYMENT_RETURN_URL").unwrap_or(checkout_defaults.return_url),
            confirm_payment_method: lookup("CONFIRM_PAYMENT_METHOD")
                .unwrap_or(checkout_defaults.confirm_payment_method),
        };

        let stripe = match lookup("STRIPE_SECRET_KEY").filter(|k| !k.is_empty()) {
            Some(secret_key) => {
                let timeout_ms: u64 = match lookup("STRIPE_TIMEOUT_MS") {
                    Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                        key: "STRIPE_TIMEOUT_MS",
                        value: v,
                    })?,
                    None => 15_000,
                };
                Some(StripeSettings {
                    secret_key,
                    api_base: lookup("STRIPE_API_BASE")
                        .unwrap_or_else(|| "https://api.stripe.com".to_string()),
                    timeout: Duration::from_millis(timeout_ms),
                })
            }
            None => None,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            checkout,
            stripe,
        })
    }
}
