/// Block definition types
///
/// A block is a catalog entry describing one reusable workflow step. Placed
/// instances of a block are `GraphNode`s.

use crate::blocks::{decorators::EdgeDecorator, mapper::ConfigMapper};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Flags consumed by the block's configuration panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigComponentProps {
    /// Panel needs an authenticated session (OAuth connections, wallets)
    pub requires_auth: bool,
    /// Panel pins the wallet provider instead of letting the user pick one
    pub requires_forced_provider: bool,
}

/// Static catalog entry for one block
///
/// Immutable once the catalog is built.
#[derive(Debug, Clone)]
pub struct BlockDefinition {
    /// Globally unique block key (e.g. "swap", "chainlink-price")
    pub id: String,
    pub label: String,
    pub icon_name: String,
    pub category: String,
    /// UI node kind placed on the canvas
    pub node_type: String,
    /// Explicit backend processor name; derived from `node_type` when absent
    pub backend_type: Option<String>,
    /// Initial node payload
    pub default_data: Map<String, Value>,
    /// Chain allow-list, `None` means any chain
    pub supported_chains: Option<Vec<String>>,
    pub config_component_props: ConfigComponentProps,
    /// Hidden blocks never show up in palette categories
    pub hidden: bool,
    /// Backend config projection; absent means generic field pass-through
    pub mapper: Option<Arc<dyn ConfigMapper>>,
    /// Labels and colors for edges leaving this block's output handles
    pub edge_decorator: Option<Arc<dyn EdgeDecorator>>,
}

impl BlockDefinition {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        icon_name: impl Into<String>,
        category: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon_name: icon_name.into(),
            category: category.into(),
            node_type: node_type.into(),
            backend_type: None,
            default_data: Map::new(),
            supported_chains: None,
            config_component_props: ConfigComponentProps::default(),
            hidden: false,
            mapper: None,
            edge_decorator: None,
        }
    }

    pub fn with_backend_type(mut self, backend_type: impl Into<String>) -> Self {
        self.backend_type = Some(backend_type.into());
        self
    }

    /// Seed default data from a JSON object literal; non-objects are ignored
    pub fn with_default_data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.default_data = map;
        }
        self
    }

    pub fn with_supported_chains(mut self, chains: &[&str]) -> Self {
        self.supported_chains = Some(chains.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.config_component_props.requires_auth = true;
        self
    }

    pub fn requires_forced_provider(mut self) -> Self {
        self.config_component_props.requires_forced_provider = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_mapper(mut self, mapper: impl ConfigMapper + 'static) -> Self {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    pub fn with_edge_decorator(mut self, decorator: impl EdgeDecorator + 'static) -> Self {
        self.edge_decorator = Some(Arc::new(decorator));
        self
    }

    /// Backend processor name for this block
    pub fn resolved_backend_type(&self) -> String {
        self.backend_type
            .clone()
            .unwrap_or_else(|| block_id_to_backend_type(&self.node_type))
    }

    /// Whether the block may run on `chain`
    pub fn supports_chain(&self, chain: &str) -> bool {
        match &self.supported_chains {
            Some(chains) => chains.iter().any(|c| c.eq_ignore_ascii_case(chain)),
            None => true,
        }
    }
}

/// Palette group of non-hidden blocks
#[derive(Debug, Clone)]
pub struct CategoryDefinition<'a> {
    pub id: String,
    pub label: String,
    pub blocks: Vec<&'a BlockDefinition>,
}

/// Generic backend type derivation: uppercase, `-` becomes `_`
pub fn block_id_to_backend_type(id: &str) -> String {
    id.to_uppercase().replace('-', "_")
}
