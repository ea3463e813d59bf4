//! The application layer, containing configuration, pricing, and the
//! checkout service.

pub mod config;
pub mod pricing;
pub mod service;
pub mod state;

pub use config::{CheckoutConfig, DEFAULT_RPC_URL, default_catalog};
pub use service::{CheckoutService, DISCOUNT_MESSAGE, THANKS_MESSAGE};
pub use state::AppState;
