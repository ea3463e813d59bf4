//! Infrastructure layer implementations.

pub mod solana;

pub use solana::{RpcLedgerClient, RpcLedgerConfig, keypair_from_base58};
