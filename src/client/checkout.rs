//! Buyer-side checkout orchestration.
//!
//! Requests a partially signed transaction from the shop endpoint, signs
//! it with the buyer's wallet keypair, submits it, and waits for the
//! reference key to confirm on chain.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use solana_sdk::{
    pubkey::Pubkey,
    signer::{Signer, keypair::Keypair},
    transaction::Transaction,
};
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::domain::{
    AppError, BlockchainError, CheckoutTransactionRequest, CheckoutTransactionResponse,
    ErrorResponse, LedgerClient, ShopMetadataResponse,
};

use super::poller::{PollPolicy, await_confirmation};

/// Result of a completed checkout
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// Signature of the confirmed payment transaction
    pub signature: String,
    /// Status line returned by the shop
    pub message: String,
}

/// HTTP client for the shop's transaction-assembly endpoint
pub struct CheckoutClient {
    http: Client,
    base_url: String,
}

impl CheckoutClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Blockchain(BlockchainError::Connection(e.to_string())))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/makeTransaction", self.base_url)
    }

    /// Fetch the shop's display metadata
    pub async fn shop_metadata(&self) -> Result<ShopMetadataResponse, AppError> {
        let response = self
            .http
            .get(self.endpoint())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        response
            .json::<ShopMetadataResponse>()
            .await
            .map_err(|e| AppError::Serialization(e.to_string()))
    }

    /// Request a checkout transaction for the given items.
    ///
    /// Returns the decoded transaction (already carrying the shop's
    /// signature) and the shop's status message.
    #[instrument(skip(self, items))]
    pub async fn request_transaction(
        &self,
        items: &[(&str, u64)],
        reference: &Pubkey,
        buyer: &Pubkey,
    ) -> Result<(Transaction, String), AppError> {
        let mut query: Vec<(String, String)> = items
            .iter()
            .map(|(id, quantity)| (id.to_string(), quantity.to_string()))
            .collect();
        query.push(("reference".to_string(), reference.to_string()));

        let body = CheckoutTransactionRequest {
            account: buyer.to_string(),
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&query)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(AppError::Internal(format!(
                "Checkout request failed: {}",
                error
            )));
        }

        let payload = response
            .json::<CheckoutTransactionResponse>()
            .await
            .map_err(|e| AppError::Serialization(e.to_string()))?;

        let bytes = general_purpose::STANDARD
            .decode(&payload.transaction)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        let transaction: Transaction =
            bincode::deserialize(&bytes).map_err(|e| AppError::Serialization(e.to_string()))?;

        Ok((transaction, payload.message))
    }

    /// Sign the shop's transaction with the buyer wallet and submit it
    #[instrument(skip(self, ledger, wallet, transaction))]
    pub async fn sign_and_send(
        &self,
        ledger: &dyn LedgerClient,
        wallet: &Keypair,
        mut transaction: Transaction,
    ) -> Result<String, AppError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[wallet], blockhash)
            .map_err(|e| {
                AppError::Blockchain(BlockchainError::InvalidSignature(e.to_string()))
            })?;
        ledger.send_transaction(&transaction).await
    }

    /// Run the whole buyer flow: request, sign, submit, await confirmation
    #[instrument(skip(self, ledger, wallet, items, policy, shutdown))]
    pub async fn run_checkout(
        &self,
        ledger: &dyn LedgerClient,
        wallet: &Keypair,
        items: &[(&str, u64)],
        policy: &PollPolicy,
        shutdown: watch::Receiver<bool>,
    ) -> Result<CheckoutOutcome, AppError> {
        // fresh reference keypair per checkout; only the pubkey is used
        let reference = Keypair::new().pubkey();
        let buyer = wallet.pubkey();

        let (transaction, message) = self
            .request_transaction(items, &reference, &buyer)
            .await?;
        info!(message = %message, "Received checkout transaction");

        let submitted = self.sign_and_send(ledger, wallet, transaction).await?;
        info!(signature = %submitted, "Payment submitted");

        let signature = await_confirmation(ledger, &reference, policy, shutdown).await?;
        info!(signature = %signature, "Payment confirmed");

        Ok(CheckoutOutcome { signature, message })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Blockchain(BlockchainError::Timeout(err.to_string()))
    } else {
        AppError::Blockchain(BlockchainError::Connection(err.to_string()))
    }
}
