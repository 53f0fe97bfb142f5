/// Safe signing flow
///
/// Drives one `node:signature_required` request through the local Safe SDK:
/// connect → rebuild the transaction → sign as the wallet's signer →
/// recompute and compare the hash
/// → submit the signature → optionally broadcast the transaction from the
/// client and report its hash.
///
/// The SDK, the wallet and the backend are traits so the embedding
/// application supplies the real implementations.

use crate::api::{ApiError, SignResponse, WorkflowClient};
use crate::config::SigningConfig;
use crate::signing::error::SigningError;
use crate::signing::receipts::{wait_for_receipt, PollPolicy};
use crate::signing::types::{
    ClientTransaction, SafeTransaction, SafeTxData, SignatureRequest, TransactionReceipt,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Safe Protocol Kit instance bound to one Safe and one signer
#[async_trait]
pub trait SafeSdk: Send + Sync {
    async fn create_transaction(&self, data: &SafeTxData) -> Result<SafeTransaction, SigningError>;

    /// Add the connected signer's signature
    async fn sign_transaction(&self, tx: SafeTransaction) -> Result<SafeTransaction, SigningError>;

    async fn transaction_hash(&self, tx: &SafeTransaction) -> Result<String, SigningError>;
}

/// Creates `SafeSdk` instances
#[async_trait]
pub trait SafeSdkConnector: Send + Sync {
    async fn connect(
        &self,
        provider: Arc<dyn WalletProvider>,
        safe_address: &str,
    ) -> Result<Box<dyn SafeSdk>, SigningError>;
}

/// The user's injected wallet
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Address of the connected signer
    async fn address(&self) -> Result<String, SigningError>;

    async fn chain_id(&self) -> Result<u64, SigningError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), SigningError>;

    /// Broadcast a transaction; returns its hash
    async fn send_transaction(&self, tx: &ClientTransaction) -> Result<String, SigningError>;

    /// `None` while the transaction is still pending
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>, SigningError>;
}

/// Backend endpoints the signing flow calls
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn submit_signature(&self, execution_id: &str, signature: &str) -> Result<SignResponse, ApiError>;

    async fn report_client_tx(&self, execution_id: &str, tx_hash: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ExecutionBackend for WorkflowClient {
    async fn submit_signature(&self, execution_id: &str, signature: &str) -> Result<SignResponse, ApiError> {
        WorkflowClient::submit_signature(self, execution_id, signature).await
    }

    async fn report_client_tx(&self, execution_id: &str, tx_hash: &str) -> Result<(), ApiError> {
        WorkflowClient::report_client_tx(self, execution_id, tx_hash).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningState {
    Idle,
    Signing,
    Submitting,
    Done,
}

/// Result of a completed signing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutcome {
    /// Encoded signatures sent to the backend
    pub signature: String,
    /// Hash of the transaction the client broadcast, if it had to
    pub client_tx_hash: Option<String>,
}

pub struct SigningFlow {
    backend: Arc<dyn ExecutionBackend>,
    connector: Arc<dyn SafeSdkConnector>,
    provider: Option<Arc<dyn WalletProvider>>,
    poll: PollPolicy,
    state: SigningState,
    last_error: Option<String>,
}

impl SigningFlow {
    pub fn new(backend: Arc<dyn ExecutionBackend>, connector: Arc<dyn SafeSdkConnector>) -> Self {
        Self {
            backend,
            connector,
            provider: None,
            poll: PollPolicy::default(),
            state: SigningState::Idle,
            last_error: None,
        }
    }

    /// Flow polling receipts as the signing section of the configuration says
    pub fn from_config(
        backend: Arc<dyn ExecutionBackend>,
        connector: Arc<dyn SafeSdkConnector>,
        config: &SigningConfig,
    ) -> Self {
        Self::new(backend, connector).with_poll_policy(PollPolicy::from(config))
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn with_provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn set_provider(&mut self, provider: Option<Arc<dyn WalletProvider>>) {
        self.provider = provider;
    }

    pub fn state(&self) -> SigningState {
        self.state
    }

    /// Message of the last failed run, cleared when a new run starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Back to `Idle` after a completed run
    pub fn reset(&mut self) {
        self.state = SigningState::Idle;
        self.last_error = None;
    }

    /// Sign `request` for the Safe at `safe_address` and resume the execution
    ///
    /// On any failure the flow is back in `Idle` with `last_error` set, and
    /// the same request can be retried.
    pub async fn sign(
        &mut self,
        request: &SignatureRequest,
        safe_address: &str,
    ) -> Result<SigningOutcome, SigningError> {
        self.last_error = None;
        self.state = SigningState::Signing;
        tracing::info!(
            "✍️ Signing Safe transaction for node {} of execution {}",
            request.node_id,
            request.execution_id
        );

        match self.run(request, safe_address).await {
            Ok(outcome) => {
                self.state = SigningState::Done;
                tracing::info!("✅ Execution {} resumed", request.execution_id);
                Ok(outcome)
            }
            Err(e) => {
                self.state = SigningState::Idle;
                self.last_error = Some(e.to_string());
                tracing::warn!("⚠️ Signing failed for execution {}: {}", request.execution_id, e);
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        request: &SignatureRequest,
        safe_address: &str,
    ) -> Result<SigningOutcome, SigningError> {
        let provider = self.provider.clone().ok_or(SigningError::MissingProvider)?;

        let sdk = self.connector.connect(Arc::clone(&provider), safe_address).await?;
        let tx = sdk.create_transaction(&request.safe_tx_data).await?;
        let signed = sdk.sign_transaction(tx).await?;
        let signer = provider.address().await?;
        if !signed.is_signed_by(&signer) {
            return Err(SigningError::Sdk(format!("no signature from {}", signer)));
        }
        let actual = sdk.transaction_hash(&signed).await?;

        if !actual.eq_ignore_ascii_case(&request.safe_tx_hash) {
            tracing::error!(
                "❌ Safe tx hash mismatch: server {} vs local {}",
                request.safe_tx_hash,
                actual
            );
            return Err(SigningError::HashMismatch {
                expected: request.safe_tx_hash.clone(),
                actual,
            });
        }

        let signature = signed.encoded_signatures();
        self.state = SigningState::Submitting;
        let response = self
            .backend
            .submit_signature(&request.execution_id, &signature)
            .await?;

        let client_tx_hash = if response.submit_on_client {
            Some(self.submit_on_client(&*provider, request, &response).await?)
        } else {
            None
        };

        Ok(SigningOutcome {
            signature,
            client_tx_hash,
        })
    }

    /// Wait for the receipt of a client-broadcast transaction
    pub async fn confirm_client_tx(&self, tx_hash: &str) -> Result<TransactionReceipt, SigningError> {
        let provider = self.provider.as_deref().ok_or(SigningError::MissingProvider)?;
        wait_for_receipt(provider, tx_hash, self.poll).await
    }

    /// Broadcast the resumed transaction from the user's wallet
    async fn submit_on_client(
        &self,
        provider: &dyn WalletProvider,
        request: &SignatureRequest,
        response: &SignResponse,
    ) -> Result<String, SigningError> {
        let payload = response
            .payload
            .as_ref()
            .ok_or_else(|| SigningError::InvalidPayload("missing payload".to_string()))?;
        let tx = ClientTransaction::from_payload(payload)
            .map_err(|e| SigningError::InvalidPayload(e.to_string()))?;

        if provider.chain_id().await? != tx.chain_id {
            tracing::info!("🔀 Switching wallet to chain {}", tx.chain_id);
            provider.switch_chain(tx.chain_id).await?;
        }

        let tx_hash = provider.send_transaction(&tx).await?;
        let execution_id = response
            .execution_id
            .as_deref()
            .unwrap_or(&request.execution_id);
        self.backend.report_client_tx(execution_id, &tx_hash).await?;
        tracing::info!("📤 Client-submitted transaction {} reported", tx_hash);
        Ok(tx_hash)
    }
}
