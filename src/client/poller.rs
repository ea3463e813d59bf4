//! Confirmation polling for the buyer side of the checkout flow.
//!
//! Looks up the one-time reference key on chain until a transaction
//! mentioning it is confirmed. Bounded attempts with exponential backoff,
//! cancellable through a watch channel tied to the caller's lifetime.

use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::domain::{AppError, BlockchainError, LedgerClient};

/// Backoff and attempt bounds for confirmation polling
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Backoff cap
    pub max_delay: Duration,
    /// Total lookup attempts before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            max_attempts: 30,
        }
    }
}

/// Wait until a transaction tagged with `reference` is confirmed.
///
/// Returns the confirming signature. Lookup errors are logged and count
/// against the attempt budget; a dropped or triggered shutdown channel
/// cancels the poll immediately.
#[instrument(skip(ledger, policy, shutdown))]
pub async fn await_confirmation(
    ledger: &dyn LedgerClient,
    reference: &Pubkey,
    policy: &PollPolicy,
    mut shutdown: watch::Receiver<bool>,
) -> Result<String, AppError> {
    let mut delay = policy.initial_delay;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Err(AppError::Cancelled);
                    }
                }
            }
            delay = (delay * 2).min(policy.max_delay);
        }
        if *shutdown.borrow() {
            return Err(AppError::Cancelled);
        }

        match ledger.signatures_for_address(reference).await {
            Ok(signatures) => match signatures.first() {
                Some(signature) => match ledger.transaction_confirmed(signature).await {
                    Ok(true) => return Ok(signature.clone()),
                    Ok(false) => {
                        debug!(signature = %signature, "Transaction seen but not yet confirmed");
                    }
                    Err(e) => {
                        warn!(signature = %signature, error = ?e, "Error checking confirmation");
                    }
                },
                None => debug!(attempt = attempt, "No transaction for reference yet"),
            },
            Err(e) => warn!(attempt = attempt, error = ?e, "Reference lookup failed"),
        }
    }

    Err(AppError::Blockchain(BlockchainError::Timeout(format!(
        "No confirmed transaction for reference {} after {} attempts",
        reference, policy.max_attempts
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLedgerClient;

    fn shutdown_pair() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    #[tokio::test]
    async fn test_immediate_confirmation() {
        let mock = MockLedgerClient::new().with_reference_signature("sig_1", true);
        let (_tx, rx) = shutdown_pair();

        let result =
            await_confirmation(&mock, &Pubkey::new_unique(), &PollPolicy::default(), rx).await;
        assert_eq!(result.unwrap(), "sig_1");
    }

    #[tokio::test]
    async fn test_times_out_after_max_attempts() {
        let mock = MockLedgerClient::new();
        let (_tx, rx) = shutdown_pair();
        let policy = PollPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            max_attempts: 3,
        };

        tokio::time::pause();
        let result = await_confirmation(&mock, &Pubkey::new_unique(), &policy, rx).await;
        assert!(matches!(
            result,
            Err(AppError::Blockchain(BlockchainError::Timeout(_)))
        ));
        assert_eq!(mock.call_count("signatures_for_address"), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let mock = MockLedgerClient::new().with_reference_signature("sig_1", true);
        let (tx, rx) = shutdown_pair();
        tx.send(true).unwrap();

        let result =
            await_confirmation(&mock, &Pubkey::new_unique(), &PollPolicy::default(), rx).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert_eq!(mock.call_count("signatures_for_address"), 0);
    }

    #[tokio::test]
    async fn test_cancelled_mid_poll() {
        let mock = MockLedgerClient::new();
        let (tx, rx) = shutdown_pair();
        let policy = PollPolicy {
            initial_delay: Duration::from_secs(60),
            max_delay: Duration::from_secs(60),
            max_attempts: 10,
        };

        let reference = Pubkey::new_unique();
        let handle = tokio::spawn(async move {
            await_confirmation(&mock, &reference, &policy, rx).await
        });
        // let the first lookup complete, then cancel during the sleep
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_unconfirmed_signature_retries() {
        let mock = MockLedgerClient::new().with_reference_signature("sig_1", false);
        let (_tx, rx) = shutdown_pair();
        let policy = PollPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            max_attempts: 2,
        };

        tokio::time::pause();
        let result = await_confirmation(&mock, &Pubkey::new_unique(), &policy, rx).await;
        assert!(result.is_err());
        assert_eq!(mock.call_count("transaction_confirmed"), 2);
    }
}
