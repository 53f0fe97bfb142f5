/// Signing flow errors
///
/// Wallet, SDK, receipt and backend failures of a signing run. Backend
/// errors keep their `ApiError` so callers can still branch on category.

use crate::api::ApiError;
use thiserror::Error;

/// Signing flow failures; all of them leave the flow retryable
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("no wallet provider connected")]
    MissingProvider,

    #[error("safe transaction hash mismatch: expected {expected}, computed {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("request rejected in wallet: {0}")]
    Rejected(String),

    #[error("safe sdk error: {0}")]
    Sdk(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("invalid client transaction payload: {0}")]
    InvalidPayload(String),

    #[error("no receipt for {tx_hash} after {attempts} attempts")]
    ReceiptTimeout { tx_hash: String, attempts: u32 },

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error(transparent)]
    Backend(#[from] ApiError),
}
