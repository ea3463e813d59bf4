//! Application service layer: checkout transaction assembly.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use solana_sdk::{
    instruction::AccountMeta,
    pubkey::Pubkey,
    signer::{Signer, keypair::Keypair},
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token_interface::instruction as token_instruction;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::app::pricing::{
    self, COUPON_DISCOUNT_THRESHOLD, COUPONS_EARNED, COUPONS_REDEEMED,
};
use crate::domain::{
    AppError, BlockchainError, CheckoutQuery, CheckoutTransactionRequest,
    CheckoutTransactionResponse, ConfigError, HealthResponse, HealthStatus, LedgerClient,
    MintInfo, ShopMetadataResponse, ValidationError,
};

use super::config::CheckoutConfig;

/// Status line when the coupon discount applied
pub const DISCOUNT_MESSAGE: &str = "50% Discount! You paid with 5 coupons.";

/// Status line for a full-price purchase
pub const THANKS_MESSAGE: &str = "Thanks for your order! You earned a coupon.";

/// Application service containing the checkout business logic
pub struct CheckoutService {
    ledger: Arc<dyn LedgerClient>,
    config: CheckoutConfig,
}

impl CheckoutService {
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>, config: CheckoutConfig) -> Self {
        Self { ledger, config }
    }

    /// Static display metadata for the GET handler
    #[must_use]
    pub fn metadata(&self) -> ShopMetadataResponse {
        ShopMetadataResponse {
            label: self.config.label.clone(),
            icon: self.config.icon.clone(),
        }
    }

    /// Assemble the checkout transaction for a buyer.
    ///
    /// Validates the query and body, prices the order, applies the coupon
    /// discount when the buyer qualifies, and returns the partially signed
    /// serialized transaction. All input validation happens before the
    /// first ledger call.
    #[instrument(skip(self, query, request))]
    pub async fn create_checkout_transaction(
        &self,
        query: &CheckoutQuery,
        request: &CheckoutTransactionRequest,
    ) -> Result<CheckoutTransactionResponse, AppError> {
        let amount = pricing::compute_amount(&self.config.catalog, query);
        if amount <= 0.0 {
            warn!("Rejected checkout with zero charge");
            return Err(ValidationError::ZeroAmount.into());
        }

        let reference = query
            .reference
            .as_deref()
            .ok_or(ValidationError::MissingReference)?;
        let reference = parse_account("reference", reference)?;

        if request.validate().is_err() {
            return Err(ValidationError::MissingAccount.into());
        }
        let buyer = parse_account("account", &request.account)?;

        let shop_keypair = self
            .config
            .shop_keypair
            .as_ref()
            .ok_or(ConfigError::MissingShopKey)?;
        let shop = shop_keypair.pubkey();

        info!(buyer = %buyer, amount = %amount, "Assembling checkout transaction");

        let price_mint = self.ledger.mint_info(&self.config.price_mint).await?;
        let coupon_mint = self.ledger.mint_info(&self.config.coupon_mint).await?;

        let buyer_coupon_account = self
            .ensure_coupon_account(shop_keypair, &buyer, &coupon_mint)
            .await?;
        let shop_coupon_account = get_associated_token_address_with_program_id(
            &shop,
            &self.config.coupon_mint,
            &coupon_mint.token_program,
        );

        let coupon_scale = 10u64.pow(coupon_mint.decimals as u32);
        let coupon_balance = self
            .ledger
            .token_account_balance(&buyer_coupon_account)
            .await?;
        let discounted = coupon_balance >= COUPON_DISCOUNT_THRESHOLD * coupon_scale;

        let raw_amount = pricing::to_base_units(amount, price_mint.decimals);
        let raw_charge = if discounted {
            pricing::apply_discount(raw_amount)
        } else {
            raw_amount
        };
        debug!(
            coupon_balance = %coupon_balance,
            discounted = %discounted,
            raw_charge = %raw_charge,
            "Priced checkout"
        );

        // Payment instruction, buyer -> shop in the price token. The
        // reference key rides along as a non-signer, non-writable meta so
        // the buyer can find the transaction on chain later.
        let buyer_price_account = get_associated_token_address_with_program_id(
            &buyer,
            &self.config.price_mint,
            &price_mint.token_program,
        );
        let shop_price_account = get_associated_token_address_with_program_id(
            &shop,
            &self.config.price_mint,
            &price_mint.token_program,
        );
        let mut payment_ix = token_instruction::transfer_checked(
            &price_mint.token_program,
            &buyer_price_account,
            &self.config.price_mint,
            &shop_price_account,
            &buyer,
            &[],
            raw_charge,
            price_mint.decimals,
        )
        .map_err(map_instruction_error)?;
        payment_ix
            .accounts
            .push(AccountMeta::new_readonly(reference, false));

        // Coupon instruction: redeem 5 coupons on a discounted purchase,
        // accrue 1 otherwise. The shop is a required signer either way.
        let mut coupon_ix = if discounted {
            token_instruction::transfer_checked(
                &coupon_mint.token_program,
                &buyer_coupon_account,
                &self.config.coupon_mint,
                &shop_coupon_account,
                &buyer,
                &[],
                COUPONS_REDEEMED * coupon_scale,
                coupon_mint.decimals,
            )
        } else {
            token_instruction::transfer_checked(
                &coupon_mint.token_program,
                &shop_coupon_account,
                &self.config.coupon_mint,
                &buyer_coupon_account,
                &shop,
                &[],
                COUPONS_EARNED * coupon_scale,
                coupon_mint.decimals,
            )
        }
        .map_err(map_instruction_error)?;
        coupon_ix.accounts.push(AccountMeta::new_readonly(shop, true));

        let blockhash = self.ledger.get_latest_blockhash().await?;
        let mut transaction =
            Transaction::new_with_payer(&[payment_ix, coupon_ix], Some(&buyer));
        transaction
            .try_partial_sign(&[shop_keypair], blockhash)
            .map_err(|e| {
                AppError::Blockchain(BlockchainError::InvalidSignature(e.to_string()))
            })?;

        let serialized = bincode::serialize(&transaction)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        let encoded = general_purpose::STANDARD.encode(serialized);

        let message = if discounted {
            DISCOUNT_MESSAGE
        } else {
            THANKS_MESSAGE
        };
        info!(buyer = %buyer, discounted = %discounted, "Checkout transaction assembled");

        Ok(CheckoutTransactionResponse {
            transaction: encoded,
            message: message.to_string(),
        })
    }

    /// Resolve the buyer's coupon associated token account, creating it
    /// with the shop paying the rent when it does not exist yet.
    async fn ensure_coupon_account(
        &self,
        shop_keypair: &Keypair,
        buyer: &Pubkey,
        coupon_mint: &MintInfo,
    ) -> Result<Pubkey, AppError> {
        let coupon_account = get_associated_token_address_with_program_id(
            buyer,
            &self.config.coupon_mint,
            &coupon_mint.token_program,
        );

        if self.ledger.account_exists(&coupon_account).await? {
            return Ok(coupon_account);
        }

        info!(coupon_account = %coupon_account, buyer = %buyer, "Creating buyer coupon account");
        let create_ix = create_associated_token_account_idempotent(
            &shop_keypair.pubkey(),
            buyer,
            &self.config.coupon_mint,
            &coupon_mint.token_program,
        );
        let blockhash = self.ledger.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[create_ix],
            Some(&shop_keypair.pubkey()),
            &[shop_keypair],
            blockhash,
        );
        let signature = self.ledger.send_transaction(&transaction).await?;
        info!(signature = %signature, "Buyer coupon account created");

        Ok(coupon_account)
    }

    /// Perform a health check against the ledger
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let ledger = match self.ledger.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(_) => HealthStatus::Unhealthy,
        };
        HealthResponse::new(ledger)
    }
}

fn parse_account(field: &str, value: &str) -> Result<Pubkey, AppError> {
    value
        .parse::<Pubkey>()
        .map_err(|e| {
            AppError::Validation(ValidationError::InvalidField {
                field: field.to_string(),
                message: e.to_string(),
            })
        })
}

fn map_instruction_error<E: std::fmt::Display>(err: E) -> AppError {
    AppError::Blockchain(BlockchainError::TransactionFailed(format!(
        "Failed to create transfer_checked instruction: {}",
        err
    )))
}
