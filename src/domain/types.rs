//! Domain types with validation support.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A catalog entry the shop sells, priced in the stable-value token
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Query-parameter id (e.g. "box")
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Unit price in whole stable-token units (e.g. dollars)
    pub price: f64,
}

/// Parsed checkout query parameters.
///
/// The query string carries the one-time `reference` pubkey plus
/// item-id → quantity pairs. Anything that is not a known catalog id is
/// carried along untouched and ignored by pricing.
#[derive(Debug, Clone, Default)]
pub struct CheckoutQuery {
    /// One-time reference public key (base58), used by the buyer to locate
    /// the transaction on chain later
    pub reference: Option<String>,
    /// Raw item-id → quantity parameters
    pub items: HashMap<String, String>,
}

impl CheckoutQuery {
    /// Split raw query parameters into the reference key and item quantities
    #[must_use]
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        let reference = params.remove("reference");
        Self {
            reference,
            items: params,
        }
    }

    /// Quantity requested for a catalog item id; unparseable values count as 0
    #[must_use]
    pub fn quantity(&self, id: &str) -> u64 {
        self.items
            .get(id)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
    }
}

/// POST body for the transaction-assembly endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutTransactionRequest {
    /// Buyer wallet address (base58 Solana pubkey)
    #[serde(default)]
    #[validate(length(min = 1, message = "No account provided"))]
    #[schema(example = "HvwC9QSAzwEXkUkwqNNGhfNHoVqXJYfPvPZfQvJmHWcF")]
    pub account: String,
}

/// Successful response from the transaction-assembly endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutTransactionResponse {
    /// Base64-encoded serialized transaction, partially signed by the shop
    pub transaction: String,
    /// Human-readable status line shown by the wallet
    #[schema(example = "Thanks for your order!")]
    pub message: String,
}

/// Static display metadata returned on GET
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShopMetadataResponse {
    /// Shop display label
    #[schema(example = "Cookie Corner")]
    pub label: String,
    /// Icon URL shown by the wallet
    pub icon: String,
}

/// Error response wire shape
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    #[schema(example = "No reference provided")]
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Ledger RPC reachable
    Healthy,
    /// Ledger RPC unavailable
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Ledger client health status
    pub ledger: HealthStatus,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
}

impl HealthResponse {
    #[must_use]
    pub fn new(ledger: HealthStatus) -> Self {
        Self {
            status: ledger,
            ledger,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_splits_reference_from_items() {
        let query = CheckoutQuery::from_params(params(&[
            ("box", "2"),
            ("reference", "4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZAMdL4VZHirAn"),
        ]));
        assert_eq!(
            query.reference.as_deref(),
            Some("4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZAMdL4VZHirAn")
        );
        assert_eq!(query.quantity("box"), 2);
        assert!(!query.items.contains_key("reference"));
    }

    #[test]
    fn test_query_missing_reference() {
        let query = CheckoutQuery::from_params(params(&[("box", "1")]));
        assert!(query.reference.is_none());
    }

    #[test]
    fn test_quantity_unparseable_is_zero() {
        let query = CheckoutQuery::from_params(params(&[("box", "two"), ("cookie", "-3")]));
        assert_eq!(query.quantity("box"), 0);
        assert_eq!(query.quantity("cookie"), 0);
        assert_eq!(query.quantity("absent"), 0);
    }

    #[test]
    fn test_transaction_request_validation() {
        let req = CheckoutTransactionRequest {
            account: "HvwC9QSAzwEXkUkwqNNGhfNHoVqXJYfPvPZfQvJmHWcF".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = CheckoutTransactionRequest {
            account: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_error_response_serialization() {
        let resp = ErrorResponse::new("No account provided");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"No account provided"}"#);
    }

    #[test]
    fn test_transaction_response_roundtrip() {
        let resp = CheckoutTransactionResponse {
            transaction: "AQID".to_string(),
            message: "Thanks for your order!".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: CheckoutTransactionResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.transaction, "AQID");
        assert_eq!(back.message, "Thanks for your order!");
    }
}
