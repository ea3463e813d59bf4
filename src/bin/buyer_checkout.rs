//! Buyer-side checkout driver.
//!
//! Runs the full flow against a running checkout server: request the
//! transaction, sign it with the buyer wallet, submit it, and wait for the
//! reference key to confirm. Item quantities come from the command line as
//! `id=quantity` pairs, e.g. `buyer_checkout box=1 cookie=2`.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solana_pos_checkout::app::DEFAULT_RPC_URL;
use solana_pos_checkout::client::{CheckoutClient, PollPolicy};
use solana_pos_checkout::infra::{RpcLedgerClient, keypair_from_base58};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let items = parse_items()?;
    if items.is_empty() {
        bail!("no items given; usage: buyer_checkout <id>=<quantity> [..]");
    }

    let base_url =
        env::var("CHECKOUT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let rpc_url = env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
    let wallet_key = env::var("BUYER_PRIVATE_KEY")
        .context("BUYER_PRIVATE_KEY not set (base58-encoded wallet key)")?;
    let wallet = keypair_from_base58(&SecretString::from(wallet_key))
        .map_err(|e| anyhow::anyhow!("invalid BUYER_PRIVATE_KEY: {}", e))?;

    let client = CheckoutClient::new(&base_url, Duration::from_secs(30))
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let ledger = RpcLedgerClient::with_defaults(&rpc_url);

    let metadata = client
        .shop_metadata()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("Checking out at {}", metadata.label);

    // ctrl-c cancels the confirmation poll
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Cancelling checkout");
            let _ = shutdown_tx.send(true);
        }
    });

    let item_refs: Vec<(&str, u64)> = items
        .iter()
        .map(|(id, quantity)| (id.as_str(), *quantity))
        .collect();

    let outcome = client
        .run_checkout(
            &ledger,
            &wallet,
            &item_refs,
            &PollPolicy::default(),
            shutdown_rx,
        )
        .await
        .map_err(|e| anyhow::anyhow!("checkout failed: {}", e))?;

    println!("{}", outcome.message);
    println!("Confirmed: {}", outcome.signature);
    Ok(())
}

fn parse_items() -> Result<Vec<(String, u64)>> {
    let mut items = Vec::new();
    for arg in env::args().skip(1) {
        let (id, quantity) = arg
            .split_once('=')
            .with_context(|| format!("bad item argument '{}', expected id=quantity", arg))?;
        let quantity: u64 = quantity
            .parse()
            .with_context(|| format!("bad quantity in '{}'", arg))?;
        items.push((id.to_string(), quantity));
    }
    Ok(items)
}
