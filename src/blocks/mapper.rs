/// Per-block backend config projections
///
/// Each mapper decides which node data fields are backend-authoritative and
/// get persisted in `config`. Anything a mapper does not project (quote
/// previews, transaction hashes, UI toggles) is transient and rebuilt by
/// the client after load.

use serde_json::{json, Map, Value};
use std::fmt;

/// Translation between a node's `data` and the backend `config`
pub trait ConfigMapper: Send + Sync + fmt::Debug {
    /// Project node data into backend config
    fn extract(&self, data: &Map<String, Value>) -> Map<String, Value>;

    /// Rebuild node data from backend config
    fn restore(&self, config: &Map<String, Value>) -> Map<String, Value> {
        config.clone()
    }

    /// Data fields that are never persisted
    fn transient_fields(&self) -> &[&'static str] {
        &[]
    }

    /// `extract` without any transient field
    fn persisted_config(&self, data: &Map<String, Value>) -> Map<String, Value> {
        let mut config = self.extract(data);
        strip_fields(&mut config, self.transient_fields());
        config
    }

    /// `restore` without any transient field
    fn restored_data(&self, config: &Map<String, Value>) -> Map<String, Value> {
        let mut data = self.restore(config);
        strip_fields(&mut data, self.transient_fields());
        data
    }
}

fn strip_fields(map: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        map.remove(*field);
    }
}

/// One persisted field, optionally defaulted when the node lacks it
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn required(name: &'static str) -> Self {
        Self { name, default: None }
    }

    pub fn defaulted(name: &'static str, default: Value) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }
}

/// Flat field-list projection used by most blocks
#[derive(Debug, Clone)]
pub struct FieldProjection {
    fields: Vec<FieldSpec>,
    transient: &'static [&'static str],
}

impl FieldProjection {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            transient: &[],
        }
    }

    /// Shorthand for a projection of plain fields without defaults
    pub fn of(names: &[&'static str]) -> Self {
        Self::new(names.iter().map(|n| FieldSpec::required(*n)).collect())
    }

    pub fn with_transient(mut self, transient: &'static [&'static str]) -> Self {
        self.transient = transient;
        self
    }

}

impl ConfigMapper for FieldProjection {
    fn extract(&self, data: &Map<String, Value>) -> Map<String, Value> {
        let mut config = Map::new();
        for field in &self.fields {
            match data.get(field.name) {
                Some(value) if !value.is_null() => {
                    config.insert(field.name.to_string(), value.clone());
                }
                _ => {
                    if let Some(default) = &field.default {
                        config.insert(field.name.to_string(), default.clone());
                    }
                }
            }
        }
        config
    }

    fn transient_fields(&self) -> &[&'static str] {
        self.transient
    }
}

/// Canonical swap direction the backend accepts
pub const SWAP_TYPE_EXACT_INPUT: &str = "EXACT_INPUT";

const SWAP_SCALAR_FIELDS: &[&str] = &[
    "swapProvider",
    "swapChain",
    "walletAddress",
    "amount",
    "slippageTolerance",
];

const SWAP_TRANSIENT_FIELDS: &[&str] = &["quote", "txHash", "approvalTxHash", "lastQuotedAt"];

/// Swap block projection
///
/// Canvas data keeps tokens flat (`sourceTokenAddress`, ...); the backend
/// wants nested `sourceToken` / `destinationToken` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapConfigMapper;

impl SwapConfigMapper {
    fn token(data: &Map<String, Value>, prefix: &str) -> Option<Value> {
        let address = data.get(&format!("{}Address", prefix))?;
        if address.is_null() {
            return None;
        }
        let symbol = data
            .get(&format!("{}Symbol", prefix))
            .cloned()
            .unwrap_or(Value::Null);
        let decimals = match data.get(&format!("{}Decimals", prefix)) {
            Some(Value::String(s)) => s.parse::<u64>().map(Value::from).unwrap_or(Value::Null),
            Some(v) => v.clone(),
            None => Value::Null,
        };
        Some(json!({ "address": address, "symbol": symbol, "decimals": decimals }))
    }

    fn flatten_token(token: &Value, prefix: &str, out: &mut Map<String, Value>) {
        for (key, suffix) in [("address", "Address"), ("symbol", "Symbol"), ("decimals", "Decimals")] {
            if let Some(v) = token.get(key).filter(|v| !v.is_null()) {
                out.insert(format!("{}{}", prefix, suffix), v.clone());
            }
        }
    }
}

impl ConfigMapper for SwapConfigMapper {
    fn extract(&self, data: &Map<String, Value>) -> Map<String, Value> {
        let mut config = Map::new();
        for field in SWAP_SCALAR_FIELDS {
            if let Some(v) = data.get(*field).filter(|v| !v.is_null()) {
                config.insert(field.to_string(), v.clone());
            }
        }
        if let Some(token) = Self::token(data, "sourceToken") {
            config.insert("sourceToken".into(), token);
        }
        if let Some(token) = Self::token(data, "destinationToken") {
            config.insert("destinationToken".into(), token);
        }
        config.insert("swapType".into(), Value::from(SWAP_TYPE_EXACT_INPUT));
        let simulate = data
            .get("simulateFirst")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        config.insert("simulateFirst".into(), Value::Bool(simulate));
        config
    }

    fn restore(&self, config: &Map<String, Value>) -> Map<String, Value> {
        let mut data = Map::new();
        for (key, value) in config {
            match key.as_str() {
                "sourceToken" => Self::flatten_token(value, "sourceToken", &mut data),
                "destinationToken" => Self::flatten_token(value, "destinationToken", &mut data),
                _ => {
                    data.insert(key.clone(), value.clone());
                }
            }
        }
        data
    }

    fn transient_fields(&self) -> &[&'static str] {
        SWAP_TRANSIENT_FIELDS
    }
}
