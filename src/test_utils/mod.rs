//! Test utilities, available behind the `test-utils` feature.

pub mod mocks;

pub use mocks::{MockConfig, MockLedgerClient, test_config};
