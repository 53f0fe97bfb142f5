/// Core workflow type definitions
///
/// Two representations live side by side: the canvas-local graph the editor
/// mutates (`GraphNode`, `GraphEdge`) and the backend's persisted wire format
/// (`BackendNode`, `BackendEdge`, `WorkflowDocument`). The mapping module
/// translates between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protected id of the single start node every graph carries
pub const START_NODE_ID: &str = "start-node";

/// Node type of the start (trigger) block
pub const START_NODE_TYPE: &str = "start";

/// Node type of the wallet block; at most one may exist per graph
pub const WALLET_NODE_TYPE: &str = "wallet-node";

/// Free-form node payload as edited by configuration panels
pub type NodeData = Map<String, Value>;

/// A point in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A placed block instance on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique id within the graph, `{block_id}-{millis}` for user-added nodes
    pub id: String,
    /// UI node kind, drives rendering and backend type derivation
    #[serde(rename = "type")]
    pub node_type: String,
    /// Canvas position
    pub position: Position,
    /// Block configuration plus runtime fields (`label`, `blockId`, `iconName`, `status`)
    #[serde(default)]
    pub data: NodeData,
}

impl GraphNode {
    /// Display label, falling back to the node id
    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or(&self.id)
    }

    pub fn is_start(&self) -> bool {
        self.node_type == START_NODE_TYPE
    }
}

/// Stroke styling applied to a decorated edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke: String,
}

/// Label text styling applied to a decorated edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub fill: String,
}

/// A directed connection between two node handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Output handle on the source ("true"/"false" on conditionals, case id on switches)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_style: Option<LabelStyle>,
}

impl GraphEdge {
    /// Deterministic edge id; identical connections share an id
    pub fn id_for(
        source: &str,
        source_handle: Option<&str>,
        target: &str,
        target_handle: Option<&str>,
    ) -> String {
        let handle = |h: Option<&str>| h.map(|h| format!(":{}", h)).unwrap_or_default();
        format!(
            "edge-{}{}-{}{}",
            source,
            handle(source_handle),
            target,
            handle(target_handle)
        )
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A user-drawn connection request, before decoration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn from_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }
}

/// The node and edge collections the editor owns
///
/// Cloning is a deep copy, which is what history snapshots rely on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl WorkflowGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn start_node(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.is_start())
    }
}

/// Backend node metadata carried through persistence for the canvas
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_type: Option<String>,
}

/// Node in the backend's wire format
///
/// `node_type` is the backend processor name in UPPER_SNAKE case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

/// Edge in the backend's wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendEdge {
    pub source_node_id: String,
    pub target_node_id: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub condition: Map<String, Value>,
    #[serde(default)]
    pub data_mapping: Map<String, Value>,
}

/// Caller-supplied workflow metadata for create/save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub is_public: bool,
}

fn default_category() -> String {
    "automation".to_string()
}

impl WorkflowDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            category: default_category(),
            is_public: false,
        }
    }
}

/// Persistence-side view of a workflow, sent on create/save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub nodes: Vec<BackendNode>,
    pub edges: Vec<BackendEdge>,
    /// Always the id of the single start node
    pub trigger_node_id: String,
    pub category: String,
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// A persisted workflow as returned by `GET /workflows/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<BackendNode>,
    #[serde(default)]
    pub edges: Vec<BackendEdge>,
    #[serde(default)]
    pub trigger_node_id: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Listing entry from `GET /workflows`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
