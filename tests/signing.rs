use async_trait::async_trait;
use blockflow::{
    api::{ApiError, SignResponse},
    config::SigningConfig,
    signing::{
        execute_with_approval, wait_for_receipt, ClientTransaction, ExecutionBackend, PollPolicy,
        SafeSdk, SafeSdkConnector, SafeSignature, SafeTransaction, SafeTxData, SignatureRequest,
        SigningError, SigningFlow, SigningState, TransactionReceipt, WalletProvider,
    },
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SIGNER: &str = "0xOwner";

/// Hash the fake SDK computes for a transaction
fn fake_hash(data: &SafeTxData) -> String {
    format!("0xHASH{}{}", data.to.trim_start_matches("0x"), data.nonce)
}

struct FakeSdk {
    signer: String,
}

#[async_trait]
impl SafeSdk for FakeSdk {
    async fn create_transaction(&self, data: &SafeTxData) -> Result<SafeTransaction, SigningError> {
        Ok(SafeTransaction::new(data.clone()))
    }

    async fn sign_transaction(&self, mut tx: SafeTransaction) -> Result<SafeTransaction, SigningError> {
        tx.add_signature(SafeSignature {
            signer: self.signer.clone(),
            data: "0xabcd".to_string(),
        });
        Ok(tx)
    }

    async fn transaction_hash(&self, tx: &SafeTransaction) -> Result<String, SigningError> {
        Ok(fake_hash(&tx.data))
    }
}

#[derive(Default)]
struct FakeConnector {
    safes: Mutex<Vec<String>>,
    /// Sign as someone other than the wallet
    foreign_signer: Option<String>,
}

#[async_trait]
impl SafeSdkConnector for FakeConnector {
    async fn connect(
        &self,
        _provider: Arc<dyn WalletProvider>,
        safe_address: &str,
    ) -> Result<Box<dyn SafeSdk>, SigningError> {
        self.safes.lock().unwrap().push(safe_address.to_string());
        Ok(Box::new(FakeSdk {
            signer: self.foreign_signer.clone().unwrap_or_else(|| SIGNER.to_string()),
        }))
    }
}

/// Wallet whose receipts appear after `confirm_after` polls (never when `None`)
struct FakeWallet {
    chain_id: Mutex<u64>,
    sent: Mutex<Vec<ClientTransaction>>,
    polls: Mutex<u32>,
    confirm_after: Option<u32>,
    reverted: bool,
}

impl FakeWallet {
    fn new(confirm_after: Option<u32>) -> Self {
        Self {
            chain_id: Mutex::new(8453),
            sent: Mutex::new(Vec::new()),
            polls: Mutex::new(0),
            confirm_after,
            reverted: false,
        }
    }

    fn sent(&self) -> Vec<ClientTransaction> {
        self.sent.lock().unwrap().clone()
    }

    fn polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn address(&self) -> Result<String, SigningError> {
        Ok(SIGNER.to_string())
    }

    async fn chain_id(&self) -> Result<u64, SigningError> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), SigningError> {
        *self.chain_id.lock().unwrap() = chain_id;
        Ok(())
    }

    async fn send_transaction(&self, tx: &ClientTransaction) -> Result<String, SigningError> {
        if *self.chain_id.lock().unwrap() != tx.chain_id {
            return Err(SigningError::Wallet("wrong chain".into()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx.clone());
        Ok(format!("0xtx{}", sent.len()))
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>, SigningError> {
        let mut polls = self.polls.lock().unwrap();
        *polls += 1;
        match self.confirm_after {
            Some(n) if *polls >= n => Ok(Some(TransactionReceipt {
                transaction_hash: tx_hash.to_string(),
                status: !self.reverted,
                block_number: Some(100),
            })),
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
struct FakeBackend {
    submit_on_client: bool,
    signatures: Mutex<Vec<(String, String)>>,
    reported: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ExecutionBackend for FakeBackend {
    async fn submit_signature(&self, execution_id: &str, signature: &str) -> Result<SignResponse, ApiError> {
        self.signatures
            .lock()
            .unwrap()
            .push((execution_id.to_string(), signature.to_string()));
        Ok(SignResponse {
            submit_on_client: self.submit_on_client,
            payload: self
                .submit_on_client
                .then(|| json!({ "to": "0xsafe", "data": "0x6a76", "value": "0", "chainId": 1 })),
            execution_id: Some(execution_id.to_string()),
        })
    }

    async fn report_client_tx(&self, execution_id: &str, tx_hash: &str) -> Result<(), ApiError> {
        self.reported
            .lock()
            .unwrap()
            .push((execution_id.to_string(), tx_hash.to_string()));
        Ok(())
    }
}

fn request(safe_tx_hash: Option<&str>) -> SignatureRequest {
    let safe_tx_data: SafeTxData =
        serde_json::from_value(json!({ "to": "0xrouter", "data": "0x1234", "nonce": 9 })).unwrap();
    SignatureRequest {
        execution_id: "exec-1".into(),
        node_id: "swap-1".into(),
        node_type: "SWAP".into(),
        safe_tx_hash: safe_tx_hash
            .map(str::to_string)
            .unwrap_or_else(|| fake_hash(&safe_tx_data).to_lowercase()),
        safe_tx_data,
        safe_address: Some("0xsafe".into()),
        chain_id: Some(1),
    }
}

#[tokio::test]
async fn hash_mismatch_never_submits() {
    let backend = Arc::new(FakeBackend::default());
    let wallet = Arc::new(FakeWallet::new(Some(1)));
    let mut flow = SigningFlow::new(backend.clone(), Arc::new(FakeConnector::default()))
        .with_provider(wallet);

    let err = flow.sign(&request(Some("0xsomethingelse")), "0xsafe").await.unwrap_err();

    assert!(matches!(err, SigningError::HashMismatch { .. }));
    assert!(backend.signatures.lock().unwrap().is_empty());
    assert_eq!(flow.state(), SigningState::Idle);
    assert!(flow.last_error().unwrap().contains("mismatch"));
}

#[tokio::test]
async fn hash_comparison_ignores_case() {
    let backend = Arc::new(FakeBackend::default());
    let connector = Arc::new(FakeConnector::default());
    let mut flow = SigningFlow::new(backend.clone(), connector.clone())
        .with_provider(Arc::new(FakeWallet::new(Some(1))));

    let outcome = flow.sign(&request(None), "0xsafe").await.unwrap();

    assert_eq!(outcome.signature, "0xabcd");
    assert!(outcome.client_tx_hash.is_none());
    assert_eq!(flow.state(), SigningState::Done);
    assert_eq!(
        *backend.signatures.lock().unwrap(),
        vec![("exec-1".to_string(), "0xabcd".to_string())]
    );
    assert_eq!(*connector.safes.lock().unwrap(), vec!["0xsafe".to_string()]);
}

#[tokio::test]
async fn client_submission_switches_chain_and_reports() {
    let backend = Arc::new(FakeBackend {
        submit_on_client: true,
        ..Default::default()
    });
    let wallet = Arc::new(FakeWallet::new(Some(1)));
    let mut flow = SigningFlow::new(backend.clone(), Arc::new(FakeConnector::default()))
        .with_provider(wallet.clone());

    let outcome = flow.sign(&request(None), "0xsafe").await.unwrap();

    assert_eq!(outcome.client_tx_hash.as_deref(), Some("0xtx1"));
    assert_eq!(wallet.sent()[0].chain_id, 1);
    assert_eq!(wallet.sent()[0].to, "0xsafe");
    assert_eq!(
        *backend.reported.lock().unwrap(),
        vec![("exec-1".to_string(), "0xtx1".to_string())]
    );
}

#[tokio::test]
async fn signature_from_another_signer_is_not_submitted() {
    let backend = Arc::new(FakeBackend::default());
    let connector = Arc::new(FakeConnector {
        foreign_signer: Some("0xStranger".into()),
        ..Default::default()
    });
    let mut flow = SigningFlow::new(backend.clone(), connector)
        .with_provider(Arc::new(FakeWallet::new(Some(1))));

    let err = flow.sign(&request(None), "0xsafe").await.unwrap_err();
    assert!(matches!(err, SigningError::Sdk(_)));
    assert!(backend.signatures.lock().unwrap().is_empty());
    assert_eq!(flow.state(), SigningState::Idle);
}

#[tokio::test]
async fn missing_provider_leaves_flow_retryable() {
    let backend = Arc::new(FakeBackend::default());
    let mut flow = SigningFlow::new(backend.clone(), Arc::new(FakeConnector::default()));

    let err = flow.sign(&request(None), "0xsafe").await.unwrap_err();
    assert!(matches!(err, SigningError::MissingProvider));
    assert_eq!(flow.state(), SigningState::Idle);

    flow.set_provider(Some(Arc::new(FakeWallet::new(Some(1)))));
    flow.sign(&request(None), "0xsafe").await.unwrap();
    assert_eq!(flow.state(), SigningState::Done);
    assert!(flow.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn receipt_arrives_within_budget() {
    let wallet = FakeWallet::new(Some(3));
    let receipt = wait_for_receipt(&wallet, "0xtx1", PollPolicy::default()).await.unwrap();
    assert!(receipt.status);
    assert_eq!(wallet.polls(), 3);
}

#[tokio::test(start_paused = true)]
async fn configured_poll_policy_bounds_client_confirmation() {
    let config = SigningConfig {
        receipt_poll_ms: 250,
        receipt_max_attempts: 4,
    };
    let wallet = Arc::new(FakeWallet::new(None));
    let flow = SigningFlow::from_config(
        Arc::new(FakeBackend::default()),
        Arc::new(FakeConnector::default()),
        &config,
    )
    .with_provider(wallet.clone());
    assert_eq!(flow.poll_policy(), PollPolicy::from(&config));

    let started = tokio::time::Instant::now();
    let err = flow.confirm_client_tx("0xtx1").await.unwrap_err();
    assert!(matches!(err, SigningError::ReceiptTimeout { attempts: 4, .. }));
    assert_eq!(wallet.polls(), 4);
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn approval_timeout_blocks_dependent_transaction() {
    let wallet = FakeWallet::new(None);
    let approval = ClientTransaction {
        to: "0xtoken".into(),
        data: "0x095ea7b3".into(),
        value: "0".into(),
        chain_id: 8453,
    };
    let swap = ClientTransaction {
        to: "0xrouter".into(),
        data: "0x5ae401dc".into(),
        value: "0".into(),
        chain_id: 8453,
    };

    let started = tokio::time::Instant::now();
    let err = execute_with_approval(&wallet, &approval, &swap, PollPolicy::default())
        .await
        .unwrap_err();

    match err {
        SigningError::ReceiptTimeout { tx_hash, attempts } => {
            assert_eq!(tx_hash, "0xtx1");
            assert_eq!(attempts, 60);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(wallet.polls(), 60);
    assert_eq!(wallet.sent().len(), 1, "the swap must not be sent");
    assert!(started.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn approval_then_action() {
    let wallet = FakeWallet::new(Some(2));
    let tx = |to: &str| ClientTransaction {
        to: to.into(),
        data: "0x".into(),
        value: "0".into(),
        chain_id: 8453,
    };
    let done = execute_with_approval(&wallet, &tx("0xtoken"), &tx("0xrouter"), PollPolicy::default())
        .await
        .unwrap();
    assert_eq!(done.approval_tx_hash, "0xtx1");
    assert_eq!(done.tx_hash, "0xtx2");
}

#[tokio::test(start_paused = true)]
async fn reverted_receipt_fails_immediately() {
    let mut wallet = FakeWallet::new(Some(1));
    wallet.reverted = true;
    let err = wait_for_receipt(&wallet, "0xtx1", PollPolicy::default()).await.unwrap_err();
    assert!(matches!(err, SigningError::Reverted { .. }));
    assert_eq!(wallet.polls(), 1);
}
