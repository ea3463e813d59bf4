//! Application state management.

use std::sync::Arc;

use crate::domain::LedgerClient;

use super::config::CheckoutConfig;
use super::service::CheckoutService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CheckoutService>,
}

impl AppState {
    /// Create the application state from a ledger client and configuration
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>, config: CheckoutConfig) -> Self {
        let service = Arc::new(CheckoutService::new(ledger, config));
        Self { service }
    }
}
