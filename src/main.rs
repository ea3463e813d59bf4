//! Application entry point.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use solana_sdk::signer::Signer;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use solana_pos_checkout::api::create_router;
use solana_pos_checkout::app::{AppState, CheckoutConfig, DEFAULT_RPC_URL};
use solana_pos_checkout::infra::RpcLedgerClient;

/// Server configuration
struct Config {
    rpc_url: String,
    host: String,
    port: u16,
    checkout: CheckoutConfig,
}

impl Config {
    fn from_env() -> Result<Self> {
        let rpc_url =
            env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let checkout = CheckoutConfig::from_env().context("Invalid checkout configuration")?;

        Ok(Self {
            rpc_url,
            host,
            port,
            checkout,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!(
        "🏗️  Point-of-Sale Checkout v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    match config.checkout.shop_keypair {
        Some(ref keypair) => info!("🔑 Shop account: {}", keypair.pubkey()),
        None => warn!("⚠ Shop keypair not configured; transaction requests will be rejected"),
    }
    info!("🏷  Coupon mint: {}", config.checkout.coupon_mint);
    info!("💵 Price mint: {}", config.checkout.price_mint);

    let ledger = RpcLedgerClient::with_defaults(&config.rpc_url);
    info!("   ✓ Ledger client created ({})", config.rpc_url);

    let app_state = Arc::new(AppState::new(Arc::new(ledger), config.checkout));
    let router = create_router(app_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🚀 Server starting on http://{}", addr);
    info!("📖 Swagger UI available at http://{}/swagger-ui", addr);
    info!("📄 OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
