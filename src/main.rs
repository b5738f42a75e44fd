use checkout_pricing::checkout::AppState;
use checkout_pricing::config::Config;
use checkout_pricing::gateway::{SandboxGateway, SharedGateway, StripeGateway};
use checkout_pricing::router::create_app_router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load()?;

    // Pick the gateway: Stripe when a key is configured, in-memory sandbox otherwise
    let gateway: SharedGateway = match &config.stripe {
        Some(stripe) => {
            info!(api_base = %stripe.api_base, "using Stripe gateway");
            Arc::new(StripeGateway::new(stripe)?)
        }
        None => {
            warn!("STRIPE_SECRET_KEY not set, using in-memory sandbox gateway");
            Arc::new(SandboxGateway::new())
        }
    };

    // Initialize application state
    let state = Arc::new(AppState::new(gateway, config.checkout.clone()));

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Configure the server address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(%addr, currency = %config.checkout.currency, "checkout service listening");

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// JSON logs when `LOG_FORMAT=json`, human-readable otherwise. Level from `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
