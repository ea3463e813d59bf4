//! Ledger RPC client implementation for Solana.

use std::time::Duration;

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use secrecy::{ExposeSecret, SecretString};
use solana_client::nonblocking::rpc_client::RpcClient as SolanaRpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    signer::keypair::Keypair,
    transaction::Transaction,
};
use tracing::{debug, info, instrument};

use crate::domain::{AppError, BlockchainError, LedgerClient, MintInfo};

/// Mint layout (both SPL Token and Token-2022):
/// - bytes 0-35: mint_authority option
/// - bytes 36-43: supply (u64)
/// - byte 44: decimals (u8)
/// - byte 45: is_initialized (bool)
/// - bytes 46-81: freeze_authority option
const MINT_DECIMALS_OFFSET: usize = 44;
const MIN_MINT_SIZE: usize = 82;

/// Token account layout: amount is at bytes 64-72 (u64 LE)
const TOKEN_ACCOUNT_AMOUNT_OFFSET: usize = 64;

/// Configuration for the RPC ledger client
#[derive(Debug, Clone)]
pub struct RpcLedgerConfig {
    pub timeout: Duration,
    pub commitment: CommitmentConfig,
}

impl Default for RpcLedgerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

/// Solana RPC ledger client
pub struct RpcLedgerClient {
    client: SolanaRpcClient,
}

impl RpcLedgerClient {
    /// Create a new ledger client with custom configuration
    #[must_use]
    pub fn new(rpc_url: &str, config: RpcLedgerConfig) -> Self {
        let client = SolanaRpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            config.timeout,
            config.commitment,
        );
        info!(rpc_url = %rpc_url, "Created ledger client");
        Self { client }
    }

    /// Create a new ledger client with default configuration
    #[must_use]
    pub fn with_defaults(rpc_url: &str) -> Self {
        Self::new(rpc_url, RpcLedgerConfig::default())
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .get_slot()
            .await
            .map_err(map_solana_client_error)?;
        Ok(())
    }

    /// Latest FINALIZED blockhash; bounds transaction validity and prevents
    /// replay against a rolled-back fork.
    #[instrument(skip(self))]
    async fn get_latest_blockhash(&self) -> Result<Hash, AppError> {
        let (blockhash, _height) = self
            .client
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await
            .map_err(map_solana_client_error)?;
        Ok(blockhash)
    }

    #[instrument(skip(self))]
    async fn mint_info(&self, mint: &Pubkey) -> Result<MintInfo, AppError> {
        let account = self.client.get_account(mint).await.map_err(|e| {
            AppError::Blockchain(BlockchainError::TransactionFailed(format!(
                "Failed to fetch mint account: {}",
                e
            )))
        })?;

        let decimals = parse_mint_decimals(&account.data)?;
        debug!(mint = %mint, decimals = %decimals, token_program = %account.owner, "Fetched mint info");

        // The mint account's owner is the token program
        Ok(MintInfo {
            decimals,
            token_program: account.owner,
        })
    }

    #[instrument(skip(self))]
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, AppError> {
        Ok(self.client.get_account(address).await.is_ok())
    }

    #[instrument(skip(self))]
    async fn token_account_balance(&self, address: &Pubkey) -> Result<u64, AppError> {
        let account = match self.client.get_account(address).await {
            Ok(account) => account,
            // a token account that does not exist yet holds nothing
            Err(_) => return Ok(0),
        };
        parse_token_amount(&account.data)
    }

    #[instrument(skip(self, transaction))]
    async fn send_transaction(&self, transaction: &Transaction) -> Result<String, AppError> {
        let signature = self
            .client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(map_solana_client_error)?;
        info!(signature = %signature, "Transaction submitted");
        Ok(signature.to_string())
    }

    #[instrument(skip(self))]
    async fn signatures_for_address(&self, address: &Pubkey) -> Result<Vec<String>, AppError> {
        let statuses = self
            .client
            .get_signatures_for_address(address)
            .await
            .map_err(map_solana_client_error)?;
        Ok(statuses.into_iter().map(|s| s.signature).collect())
    }

    #[instrument(skip(self))]
    async fn transaction_confirmed(&self, signature: &str) -> Result<bool, AppError> {
        let signature = signature.parse::<Signature>().map_err(|e| {
            AppError::Blockchain(BlockchainError::InvalidSignature(e.to_string()))
        })?;
        self.client
            .confirm_transaction(&signature)
            .await
            .map_err(map_solana_client_error)
    }
}

/// Read decimals from a raw mint account image
pub(crate) fn parse_mint_decimals(data: &[u8]) -> Result<u8, AppError> {
    if data.len() < MIN_MINT_SIZE {
        return Err(AppError::Blockchain(BlockchainError::TransactionFailed(
            format!(
                "Mint account data too small: {} bytes, expected at least {}",
                data.len(),
                MIN_MINT_SIZE
            ),
        )));
    }
    Ok(data[MINT_DECIMALS_OFFSET])
}

/// Read the raw token amount from a token account image
pub(crate) fn parse_token_amount(data: &[u8]) -> Result<u64, AppError> {
    let end = TOKEN_ACCOUNT_AMOUNT_OFFSET + 8;
    let bytes: [u8; 8] = data
        .get(TOKEN_ACCOUNT_AMOUNT_OFFSET..end)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            AppError::Blockchain(BlockchainError::TransactionFailed(format!(
                "Token account data too small: {} bytes",
                data.len()
            )))
        })?;
    Ok(u64::from_le_bytes(bytes))
}

/// Map Solana client errors to our AppError types
fn map_solana_client_error(err: solana_client::client_error::ClientError) -> AppError {
    use solana_client::client_error::ClientErrorKind;

    let msg = err.to_string();

    match err.kind() {
        ClientErrorKind::RpcError(_) => {
            if msg.contains("insufficient") || msg.contains("InsufficientFunds") {
                AppError::Blockchain(BlockchainError::InsufficientFunds)
            } else {
                AppError::Blockchain(BlockchainError::RpcError(msg))
            }
        }
        ClientErrorKind::Io(_) => AppError::Blockchain(BlockchainError::Connection(msg)),
        ClientErrorKind::Reqwest(_) => {
            if msg.contains("timeout") || msg.contains("timed out") {
                AppError::Blockchain(BlockchainError::Timeout(msg))
            } else {
                AppError::Blockchain(BlockchainError::Connection(msg))
            }
        }
        _ => AppError::Blockchain(BlockchainError::TransactionFailed(msg)),
    }
}

/// Parse a base58-encoded private key into a Solana keypair
pub fn keypair_from_base58(secret: &SecretString) -> Result<Keypair, AppError> {
    let key_bytes = bs58::decode(secret.expose_secret())
        .into_vec()
        .map_err(|e| AppError::Blockchain(BlockchainError::InvalidSignature(e.to_string())))?;

    // Handle both 32-byte (seed) and 64-byte (keypair) formats
    let seed: [u8; 32] = if key_bytes.len() == 64 {
        // Solana keypair format: first 32 bytes are the secret key
        key_bytes[..32].try_into().map_err(|_| {
            AppError::Blockchain(BlockchainError::InvalidSignature(
                "Invalid keypair format".to_string(),
            ))
        })?
    } else if key_bytes.len() == 32 {
        key_bytes.try_into().map_err(|v: Vec<u8>| {
            AppError::Blockchain(BlockchainError::InvalidSignature(format!(
                "Key must be 32 bytes, got {}",
                v.len()
            )))
        })?
    } else {
        return Err(AppError::Blockchain(BlockchainError::InvalidSignature(
            format!("Key must be 32 or 64 bytes, got {}", key_bytes.len()),
        )));
    };

    let signing_key = SigningKey::from_bytes(&seed);
    Keypair::try_from(signing_key.to_keypair_bytes().as_slice()).map_err(|e| {
        AppError::Blockchain(BlockchainError::InvalidSignature(format!(
            "Failed to create keypair: {}",
            e
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use solana_sdk::signer::Signer;

    #[test]
    fn test_client_creation() {
        let _client = RpcLedgerClient::with_defaults("https://api.devnet.solana.com");
    }

    #[test]
    fn test_rpc_ledger_config_default() {
        let config = RpcLedgerConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
    }

    #[test]
    fn test_keypair_from_base58_valid_32_bytes() {
        let original = SigningKey::generate(&mut OsRng);
        let encoded = bs58::encode(original.to_bytes()).into_string();
        let secret = SecretString::from(encoded);
        let keypair = keypair_from_base58(&secret).unwrap();

        let expected = bs58::encode(original.verifying_key().as_bytes()).into_string();
        assert_eq!(keypair.pubkey().to_string(), expected);
    }

    #[test]
    fn test_keypair_from_base58_valid_64_bytes() {
        let original = SigningKey::generate(&mut OsRng);
        let encoded = bs58::encode(original.to_keypair_bytes()).into_string();
        let secret = SecretString::from(encoded);
        let result = keypair_from_base58(&secret);
        assert!(result.is_ok());
    }

    #[test]
    fn test_keypair_from_base58_invalid() {
        let secret = SecretString::from("invalid-base58!!!");
        let result = keypair_from_base58(&secret);
        assert!(result.is_err());
    }

    #[test]
    fn test_keypair_from_base58_wrong_length() {
        // 16 bytes - too short
        let short_key = bs58::encode(vec![0u8; 16]).into_string();
        let secret = SecretString::from(short_key);
        assert!(keypair_from_base58(&secret).is_err());

        // 48 bytes - wrong size (not 32 or 64)
        let wrong_key = bs58::encode(vec![0u8; 48]).into_string();
        let secret = SecretString::from(wrong_key);
        assert!(keypair_from_base58(&secret).is_err());
    }

    #[test]
    fn test_keypair_from_base58_empty_string() {
        let secret = SecretString::from("");
        assert!(keypair_from_base58(&secret).is_err());
    }

    #[test]
    fn test_parse_mint_decimals() {
        let mut data = vec![0u8; MIN_MINT_SIZE];
        data[MINT_DECIMALS_OFFSET] = 6;
        assert_eq!(parse_mint_decimals(&data).unwrap(), 6);
    }

    #[test]
    fn test_parse_mint_decimals_data_too_small() {
        let data = vec![0u8; MIN_MINT_SIZE - 1];
        assert!(matches!(
            parse_mint_decimals(&data),
            Err(AppError::Blockchain(BlockchainError::TransactionFailed(_)))
        ));
    }

    #[test]
    fn test_parse_token_amount() {
        let mut data = vec![0u8; 165];
        data[TOKEN_ACCOUNT_AMOUNT_OFFSET..TOKEN_ACCOUNT_AMOUNT_OFFSET + 8]
            .copy_from_slice(&42u64.to_le_bytes());
        assert_eq!(parse_token_amount(&data).unwrap(), 42);
    }

    #[test]
    fn test_parse_token_amount_data_too_small() {
        let data = vec![0u8; TOKEN_ACCOUNT_AMOUNT_OFFSET + 4];
        assert!(parse_token_amount(&data).is_err());
    }
}
