//! Point-of-sale checkout service for token payments on Solana.
//!
//! The server half assembles a two-instruction payment transaction (a
//! checked stable-token transfer plus a loyalty-coupon transfer), partially
//! signs it with the shop's keypair, and serializes it for the buyer's
//! wallet. The client half requests that transaction, signs and submits it,
//! and polls the one-time reference key for confirmation.

pub mod api;
pub mod app;
pub mod client;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
