//! Error types for the checkout service.

use thiserror::Error;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Blockchain error: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Confirmation polling was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,
}

/// Client-input errors (HTTP 400)
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Can't checkout with charge of 0")]
    ZeroAmount,

    #[error("No reference provided")]
    MissingReference,

    #[error("No account provided")]
    MissingAccount,

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

/// Server-misconfiguration errors (HTTP 500)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Shop private key not available")]
    MissingShopKey,

    #[error("Invalid shop private key: {0}")]
    InvalidShopKey(String),

    #[error("Shop address {address} does not match the configured keypair {keypair}")]
    ShopAddressMismatch { address: String, keypair: String },

    #[error("Missing environment variable {0}")]
    MissingVariable(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors from ledger RPC interactions
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}
