//! Domain traits defining contracts for external systems.

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, transaction::Transaction};

use super::error::AppError;

/// Decimals and owning token program of a mint account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintInfo {
    pub decimals: u8,
    /// The mint account's owner; legacy SPL Token or Token-2022
    pub token_program: Pubkey,
}

/// Ledger client trait for chain operations
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Check ledger RPC connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Latest finalized blockhash for transaction construction
    async fn get_latest_blockhash(&self) -> Result<Hash, AppError>;

    /// Fetch decimals and token program for a mint
    async fn mint_info(&self, mint: &Pubkey) -> Result<MintInfo, AppError>;

    /// Whether an account exists on chain
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, AppError>;

    /// Raw token balance of a token account; a missing account reads as 0
    async fn token_account_balance(&self, address: &Pubkey) -> Result<u64, AppError>;

    /// Submit a fully signed transaction and wait for confirmation.
    /// Returns the transaction signature.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<String, AppError>;

    /// Signatures of transactions mentioning an address, newest first
    async fn signatures_for_address(&self, address: &Pubkey) -> Result<Vec<String>, AppError> {
        let _ = address;
        Err(AppError::Internal(
            "signatures_for_address not implemented".to_string(),
        ))
    }

    /// Whether a transaction reached confirmed or finalized commitment
    async fn transaction_confirmed(&self, signature: &str) -> Result<bool, AppError> {
        let _ = signature;
        Err(AppError::Internal(
            "transaction_confirmed not implemented".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinimalLedgerClient;

    #[async_trait]
    impl LedgerClient for MinimalLedgerClient {
        async fn health_check(&self) -> Result<(), AppError> {
            Ok(())
        }

        async fn get_latest_blockhash(&self) -> Result<Hash, AppError> {
            Ok(Hash::default())
        }

        async fn mint_info(&self, _mint: &Pubkey) -> Result<MintInfo, AppError> {
            Ok(MintInfo {
                decimals: 6,
                token_program: Pubkey::new_unique(),
            })
        }

        async fn account_exists(&self, _address: &Pubkey) -> Result<bool, AppError> {
            Ok(true)
        }

        async fn token_account_balance(&self, _address: &Pubkey) -> Result<u64, AppError> {
            Ok(0)
        }

        async fn send_transaction(&self, _transaction: &Transaction) -> Result<String, AppError> {
            Ok("sig_123".to_string())
        }
    }

    #[tokio::test]
    async fn test_default_signatures_for_address_not_implemented() {
        let client = MinimalLedgerClient;
        let result = client
            .signatures_for_address(&Pubkey::new_unique())
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_default_transaction_confirmed_not_implemented() {
        let client = MinimalLedgerClient;
        let result = client.transaction_confirmed("sig").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
