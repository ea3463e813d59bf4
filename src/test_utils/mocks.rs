//! Mock implementations for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signer::{Signer, keypair::Keypair},
    transaction::Transaction,
};

use crate::app::CheckoutConfig;
use crate::domain::{AppError, BlockchainError, LedgerClient, MintInfo};

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub should_fail: bool,
    pub error_message: Option<String>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }
}

/// Mock ledger client with a recorded call log.
///
/// The call log backs the "no ledger calls before validation" assertions;
/// balances, mints, and reference lookups are scriptable per test.
pub struct MockLedgerClient {
    config: MockConfig,
    mints: Mutex<HashMap<Pubkey, MintInfo>>,
    balance: AtomicU64,
    accounts_exist: AtomicBool,
    reference_signature: Mutex<Option<(String, bool)>>,
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<Transaction>>,
}

impl MockLedgerClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            mints: Mutex::new(HashMap::new()),
            balance: AtomicU64::new(0),
            accounts_exist: AtomicBool::new(true),
            reference_signature: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Register a mint with the given decimals (owned by the SPL Token
    /// program, which the instruction builders insist on)
    #[must_use]
    pub fn with_mint(self, mint: Pubkey, decimals: u8) -> Self {
        self.mints.lock().unwrap().insert(
            mint,
            MintInfo {
                decimals,
                token_program: spl_token_interface::id(),
            },
        );
        self
    }

    /// Token balance returned for every token account lookup
    #[must_use]
    pub fn with_balance(self, balance: u64) -> Self {
        self.balance.store(balance, Ordering::Relaxed);
        self
    }

    /// Make every account lookup report the account missing
    #[must_use]
    pub fn with_missing_accounts(self) -> Self {
        self.accounts_exist.store(false, Ordering::Relaxed);
        self
    }

    /// Script the reference lookup: one signature, confirmed or not
    #[must_use]
    pub fn with_reference_signature(self, signature: impl Into<String>, confirmed: bool) -> Self {
        *self.reference_signature.lock().unwrap() = Some((signature.into(), confirmed));
        self
    }

    /// All recorded trait calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls to a given method
    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|name| name.as_str() == method)
            .count()
    }

    /// Transactions submitted through the mock
    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock error".to_string());
            return Err(AppError::Blockchain(BlockchainError::TransactionFailed(
                msg,
            )));
        }
        Ok(())
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn health_check(&self) -> Result<(), AppError> {
        self.record("health_check");
        self.check_should_fail()
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, AppError> {
        self.record("get_latest_blockhash");
        self.check_should_fail()?;
        Ok(Hash::default())
    }

    async fn mint_info(&self, mint: &Pubkey) -> Result<MintInfo, AppError> {
        self.record("mint_info");
        self.check_should_fail()?;
        Ok(self
            .mints
            .lock()
            .unwrap()
            .get(mint)
            .copied()
            .unwrap_or(MintInfo {
                decimals: 0,
                token_program: spl_token_interface::id(),
            }))
    }

    async fn account_exists(&self, _address: &Pubkey) -> Result<bool, AppError> {
        self.record("account_exists");
        self.check_should_fail()?;
        Ok(self.accounts_exist.load(Ordering::Relaxed))
    }

    async fn token_account_balance(&self, _address: &Pubkey) -> Result<u64, AppError> {
        self.record("token_account_balance");
        self.check_should_fail()?;
        Ok(self.balance.load(Ordering::Relaxed))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<String, AppError> {
        self.record("send_transaction");
        self.check_should_fail()?;
        let mut sent = self.sent.lock().unwrap();
        sent.push(transaction.clone());
        Ok(format!("mock_sig_{}", sent.len()))
    }

    async fn signatures_for_address(&self, _address: &Pubkey) -> Result<Vec<String>, AppError> {
        self.record("signatures_for_address");
        self.check_should_fail()?;
        Ok(self
            .reference_signature
            .lock()
            .unwrap()
            .as_ref()
            .map(|(signature, _)| vec![signature.clone()])
            .unwrap_or_default())
    }

    async fn transaction_confirmed(&self, _signature: &str) -> Result<bool, AppError> {
        self.record("transaction_confirmed");
        self.check_should_fail()?;
        Ok(self
            .reference_signature
            .lock()
            .unwrap()
            .as_ref()
            .map(|(_, confirmed)| *confirmed)
            .unwrap_or(false))
    }
}

/// Checkout config with a fresh shop keypair and unique mints
#[must_use]
pub fn test_config() -> CheckoutConfig {
    let keypair = Keypair::new();
    let address = keypair.pubkey();
    CheckoutConfig::new(
        Some(keypair),
        address,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
    )
    .expect("valid test config")
}
