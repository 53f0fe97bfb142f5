/// Transaction Signing Flow
///
/// Safe-wallet signatures for executions that pause server-side:
/// - Wire types of signature requests and client transactions
/// - The idle → signing → submitting → done flow with its hash guard
/// - Bounded receipt polling for approve-then-act sequences

// Wire types of signature requests, Safe transactions and receipts
pub mod types;

// Signing failures
pub mod error;

// Trait seams and the signing state machine
pub mod flow;

// Receipt polling
pub mod receipts;

pub use error::SigningError;
pub use flow::{
    ExecutionBackend, SafeSdk, SafeSdkConnector, SigningFlow, SigningOutcome, SigningState,
    WalletProvider,
};
pub use receipts::{execute_with_approval, wait_for_receipt, ApprovedExecution, PollPolicy};
pub use types::{
    ClientTransaction, SafeSignature, SafeTransaction, SafeTxData, SignatureRequest,
    TransactionReceipt,
};
