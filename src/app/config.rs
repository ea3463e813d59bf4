//! Checkout configuration, loaded once at startup and passed into the
//! service at construction time. Request handlers never read the
//! environment.

use std::env;

use secrecy::SecretString;
use solana_sdk::{
    pubkey::Pubkey,
    signer::{Signer, keypair::Keypair},
};
use tracing::{info, warn};

use crate::domain::{ConfigError, Product};
use crate::infra::keypair_from_base58;

/// Default ledger RPC endpoint when SOLANA_RPC_URL is unset
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Shop identity, token addresses, and catalog for the checkout flow
pub struct CheckoutConfig {
    /// Shop signing credential. Absent means every POST fails with the
    /// misconfiguration error; GET metadata still works.
    pub shop_keypair: Option<Keypair>,
    /// Shop account receiving payments and holding the coupon supply
    pub shop_address: Pubkey,
    /// Loyalty-coupon mint
    pub coupon_mint: Pubkey,
    /// Stable-value token mint customers pay in
    pub price_mint: Pubkey,
    /// Display label returned on GET
    pub label: String,
    /// Icon URL returned on GET
    pub icon: String,
    /// Items the shop sells
    pub catalog: Vec<Product>,
}

impl CheckoutConfig {
    /// Build a config from explicit parts, enforcing keypair/address
    /// consistency.
    pub fn new(
        shop_keypair: Option<Keypair>,
        shop_address: Pubkey,
        coupon_mint: Pubkey,
        price_mint: Pubkey,
    ) -> Result<Self, ConfigError> {
        if let Some(ref keypair) = shop_keypair {
            if keypair.pubkey() != shop_address {
                return Err(ConfigError::ShopAddressMismatch {
                    address: shop_address.to_string(),
                    keypair: keypair.pubkey().to_string(),
                });
            }
        }
        Ok(Self {
            shop_keypair,
            shop_address,
            coupon_mint,
            price_mint,
            label: "Cookie Corner".to_string(),
            icon: "https://example.com/icon.svg".to_string(),
            catalog: default_catalog(),
        })
    }

    /// Load the full configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let shop_keypair = Self::load_shop_keypair()?;

        let shop_address = match env::var("SHOP_ADDRESS").ok().filter(|v| !v.is_empty()) {
            Some(value) => parse_pubkey("SHOP_ADDRESS", &value)?,
            None => match shop_keypair {
                Some(ref keypair) => keypair.pubkey(),
                None => return Err(ConfigError::MissingVariable("SHOP_ADDRESS".to_string())),
            },
        };

        let coupon_mint = parse_pubkey("COUPON_MINT", &require_var("COUPON_MINT")?)?;
        let price_mint = parse_pubkey("PRICE_MINT", &require_var("PRICE_MINT")?)?;

        let mut config = Self::new(shop_keypair, shop_address, coupon_mint, price_mint)?;
        if let Ok(label) = env::var("SHOP_LABEL") {
            if !label.is_empty() {
                config.label = label;
            }
        }
        if let Ok(icon) = env::var("SHOP_ICON") {
            if !icon.is_empty() {
                config.icon = icon;
            }
        }
        Ok(config)
    }

    fn load_shop_keypair() -> Result<Option<Keypair>, ConfigError> {
        let key_str = match env::var("SHOP_PRIVATE_KEY") {
            Ok(value) if !value.is_empty() => value,
            _ => {
                warn!(
                    "SHOP_PRIVATE_KEY is not set; transaction requests will be \
                     rejected until a base58-encoded key is configured"
                );
                return Ok(None);
            }
        };

        info!("Loading shop keypair from environment");
        let secret = SecretString::from(key_str);
        let keypair = keypair_from_base58(&secret)
            .map_err(|e| ConfigError::InvalidShopKey(e.to_string()))?;
        Ok(Some(keypair))
    }
}

/// The default catalog; ids are the recognized query-parameter names
#[must_use]
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product {
            id: "cookie",
            name: "Cookie",
            price: 2.5,
        },
        Product {
            id: "box",
            name: "Box of Cookies",
            price: 10.0,
        },
    ]
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(name.to_string()))
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, ConfigError> {
    value.parse::<Pubkey>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_accepts_matching_keypair_and_address() {
        let keypair = Keypair::new();
        let address = keypair.pubkey();
        let config = CheckoutConfig::new(
            Some(keypair),
            address,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_config_rejects_mismatched_shop_address() {
        let keypair = Keypair::new();
        let result = CheckoutConfig::new(
            Some(keypair),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::ShopAddressMismatch { .. })
        ));
    }

    #[test]
    fn test_config_without_keypair() {
        let config = CheckoutConfig::new(
            None,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        )
        .unwrap();
        assert!(config.shop_keypair.is_none());
        assert_eq!(config.catalog.len(), 2);
    }

    #[test]
    fn test_default_catalog_ids_are_unique() {
        let catalog = default_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_parse_pubkey_invalid() {
        let result = parse_pubkey("COUPON_MINT", "not-a-pubkey");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
