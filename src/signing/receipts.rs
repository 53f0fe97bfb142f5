/// Bounded receipt polling
///
/// A broadcast transaction is polled at a fixed interval until a receipt
/// appears or the attempt budget runs out. The dependent step of an
/// approve-then-act sequence only runs after a successful approval receipt.

use crate::config::SigningConfig;
use crate::signing::error::SigningError;
use crate::signing::flow::WalletProvider;
use crate::signing::types::{ClientTransaction, TransactionReceipt};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 60,
        }
    }
}

impl From<&SigningConfig> for PollPolicy {
    fn from(config: &SigningConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.receipt_max_attempts,
        }
    }
}

/// Wait for a successful receipt of `tx_hash`
///
/// A reverted receipt fails immediately. Lookup errors count as an attempt
/// and polling continues.
pub async fn wait_for_receipt(
    provider: &dyn WalletProvider,
    tx_hash: &str,
    policy: PollPolicy,
) -> Result<TransactionReceipt, SigningError> {
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        match provider.transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) if receipt.status => {
                tracing::info!("⛓️ Transaction {} confirmed after {} poll(s)", tx_hash, attempt);
                return Ok(receipt);
            }
            Ok(Some(_)) => {
                tracing::error!("❌ Transaction {} reverted", tx_hash);
                return Err(SigningError::Reverted {
                    tx_hash: tx_hash.to_string(),
                });
            }
            Ok(None) => {
                tracing::debug!("⏳ No receipt for {} yet ({}/{})", tx_hash, attempt, policy.max_attempts);
            }
            Err(e) => {
                tracing::warn!("⚠️ Receipt lookup for {} failed: {}", tx_hash, e);
            }
        }
    }

    Err(SigningError::ReceiptTimeout {
        tx_hash: tx_hash.to_string(),
        attempts: policy.max_attempts,
    })
}

/// Hashes of an approve-then-act sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedExecution {
    pub approval_tx_hash: String,
    pub tx_hash: String,
}

/// Send `approval`, wait for its receipt, then send `action`
pub async fn execute_with_approval(
    provider: &dyn WalletProvider,
    approval: &ClientTransaction,
    action: &ClientTransaction,
    policy: PollPolicy,
) -> Result<ApprovedExecution, SigningError> {
    let approval_tx_hash = provider.send_transaction(approval).await?;
    tracing::info!("🔓 Approval sent: {}", approval_tx_hash);

    wait_for_receipt(provider, &approval_tx_hash, policy).await?;

    let tx_hash = provider.send_transaction(action).await?;
    tracing::info!("🚀 Transaction sent after approval: {}", tx_hash);
    Ok(ApprovedExecution {
        approval_tx_hash,
        tx_hash,
    })
}
