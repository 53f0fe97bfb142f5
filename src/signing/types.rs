/// Safe transaction signing types
///
/// Wire shapes of the signature request the backend streams, the
/// transaction the Safe SDK rebuilds from it, and the client-side
/// transaction the backend may hand back after the signature is accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

fn zero() -> String {
    "0".to_string()
}

fn zero_address() -> String {
    "0x0000000000000000000000000000000000000000".to_string()
}

/// Safe transaction fields as prepared by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxData {
    pub to: String,
    #[serde(default = "zero")]
    pub value: String,
    #[serde(default)]
    pub data: String,
    /// 0 = call, 1 = delegatecall
    #[serde(default)]
    pub operation: u8,
    #[serde(default = "zero")]
    pub safe_tx_gas: String,
    #[serde(default = "zero")]
    pub base_gas: String,
    #[serde(default = "zero")]
    pub gas_price: String,
    #[serde(default = "zero_address")]
    pub gas_token: String,
    #[serde(default = "zero_address")]
    pub refund_receiver: String,
    pub nonce: u64,
}

/// `node:signature_required` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub execution_id: String,
    pub node_id: String,
    pub node_type: String,
    /// Hash the backend expects the signature to cover
    pub safe_tx_hash: String,
    pub safe_tx_data: SafeTxData,
    #[serde(default)]
    pub safe_address: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// One owner signature over a Safe transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeSignature {
    pub signer: String,
    /// Hex signature bytes, with or without `0x`
    pub data: String,
}

/// A Safe transaction with the signatures collected so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTransaction {
    pub data: SafeTxData,
    /// Key: lowercased signer address
    signatures: BTreeMap<String, SafeSignature>,
}

impl SafeTransaction {
    pub fn new(data: SafeTxData) -> Self {
        Self {
            data,
            signatures: BTreeMap::new(),
        }
    }

    /// Add or replace the signature of `signature.signer`
    pub fn add_signature(&mut self, signature: SafeSignature) {
        self.signatures
            .insert(signature.signer.to_lowercase(), signature);
    }

    pub fn signatures(&self) -> impl Iterator<Item = &SafeSignature> {
        self.signatures.values()
    }

    pub fn is_signed_by(&self, signer: &str) -> bool {
        self.signatures.contains_key(&signer.to_lowercase())
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Concatenated signatures ordered by signer address, as the Safe
    /// contract expects them
    pub fn encoded_signatures(&self) -> String {
        let body: String = self
            .signatures
            .values()
            .map(|s| s.data.trim_start_matches("0x"))
            .collect();
        format!("0x{}", body)
    }
}

/// Transaction the client must broadcast itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTransaction {
    pub to: String,
    #[serde(default)]
    pub data: String,
    #[serde(default = "zero")]
    pub value: String,
    pub chain_id: u64,
}

impl ClientTransaction {
    /// Read the `payload` of a sign response
    pub fn from_payload(payload: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload.clone())
    }
}

/// On-chain receipt of a broadcast transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    /// `true` when the transaction succeeded, `false` when it reverted
    pub status: bool,
    #[serde(default)]
    pub block_number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx_data() -> SafeTxData {
        serde_json::from_value(json!({ "to": "0xrouter", "nonce": 1 })).unwrap()
    }

    #[test]
    fn safe_tx_defaults() {
        let data = tx_data();
        assert_eq!(data.value, "0");
        assert_eq!(data.operation, 0);
        assert_eq!(data.gas_token, zero_address());
    }

    #[test]
    fn signatures_are_sorted_by_signer() {
        let mut tx = SafeTransaction::new(tx_data());
        tx.add_signature(SafeSignature { signer: "0xBBB".into(), data: "0x2222".into() });
        tx.add_signature(SafeSignature { signer: "0xaaa".into(), data: "1111".into() });
        assert_eq!(tx.encoded_signatures(), "0x11112222");

        tx.add_signature(SafeSignature { signer: "0xbbb".into(), data: "0x3333".into() });
        assert_eq!(tx.signature_count(), 2);
        assert_eq!(tx.encoded_signatures(), "0x11113333");
    }
}
