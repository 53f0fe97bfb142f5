/// Graph state model
///
/// `GraphEditor` is the single writer of the canvas graph. Every structural
/// change goes through one of its operations, which snapshot history before
/// mutating and enforce the editor invariants:
/// - exactly one start node with the protected id, never deleted, no incoming edges
/// - at most one wallet node
/// - edges always reference existing nodes (node deletes cascade)
///
/// Precondition failures are silent no-ops and never touch history.

use crate::blocks::{BlockCatalog, BlockDefinition};
use crate::config::EditorConfig;
use crate::editor::history::History;
use crate::workflow::lint::{lint_graph, GraphIssue};
use crate::workflow::mapping::build_edge;
use crate::workflow::types::{
    Connection, GraphEdge, GraphNode, NodeData, Position, WorkflowDocument, WorkflowDraft,
    WorkflowGraph, START_NODE_ID, START_NODE_TYPE, WALLET_NODE_TYPE,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Where a fresh graph places its start node
pub const START_NODE_POSITION: Position = Position { x: 250.0, y: 100.0 };

/// Ids that `delete_nodes` never removes
pub const PROTECTED_NODE_IDS: &[&str] = &[START_NODE_ID];

#[derive(Debug)]
pub struct GraphEditor {
    catalog: Arc<BlockCatalog>,
    graph: WorkflowGraph,
    history: History,
    /// Copy of the selected node as last published to the UI
    selected: Option<GraphNode>,
    /// Set when the selected node changed and the copy awaits `flush_deferred`
    selection_stale: bool,
}

impl GraphEditor {
    /// Fresh graph holding only the start node
    pub fn new(catalog: Arc<BlockCatalog>) -> Self {
        Self::with_history(catalog, History::default())
    }

    /// Fresh graph whose undo stack keeps at most `limit` snapshots
    pub fn with_history_limit(catalog: Arc<BlockCatalog>, limit: usize) -> Self {
        Self::with_history(catalog, History::with_limit(limit))
    }

    /// Fresh graph sized by the editor section of the configuration
    pub fn from_config(catalog: Arc<BlockCatalog>, config: &EditorConfig) -> Self {
        Self::with_history_limit(catalog, config.history_limit)
    }

    pub fn with_history(catalog: Arc<BlockCatalog>, history: History) -> Self {
        let start = start_node(&catalog);
        Self {
            catalog,
            graph: WorkflowGraph {
                nodes: vec![start],
                edges: Vec::new(),
            },
            history,
            selected: None,
            selection_stale: false,
        }
    }

    pub fn catalog(&self) -> &Arc<BlockCatalog> {
        &self.catalog
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.graph.edges
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn snapshot(&mut self) {
        self.history.record(self.graph.clone());
    }

    /// Unique node id for a new instance of `block_id`
    fn next_node_id(&self, block_id: &str) -> String {
        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let id = format!("{}-{}", block_id, stamp);
            if !self.graph.contains_node(&id) {
                return id;
            }
            stamp += 1;
        }
    }

    /// Place a new node for `block` at `position`
    ///
    /// Returns the new node id, or `None` when the graph already holds a
    /// wallet node and `block` is another one.
    pub fn add_node(&mut self, block: &BlockDefinition, position: Position) -> Option<String> {
        if block.node_type == WALLET_NODE_TYPE
            && self.graph.nodes.iter().any(|n| n.node_type == WALLET_NODE_TYPE)
        {
            tracing::warn!("🚫 Ignoring second wallet node; a graph holds at most one");
            return None;
        }

        let id = self.next_node_id(&block.id);
        let mut data = block.default_data.clone();
        data.insert("label".into(), Value::String(block.label.clone()));
        data.insert("blockId".into(), Value::String(block.id.clone()));
        data.insert("iconName".into(), Value::String(block.icon_name.clone()));

        self.snapshot();
        self.graph.nodes.push(GraphNode {
            id: id.clone(),
            node_type: block.node_type.clone(),
            position,
            data,
        });

        tracing::debug!("➕ Added node '{}' ({})", id, block.node_type);
        Some(id)
    }

    /// `add_node` by catalog id; unknown ids are a no-op
    pub fn add_node_by_id(&mut self, block_id: &str, position: Position) -> Option<String> {
        let catalog = Arc::clone(&self.catalog);
        let Some(block) = catalog.get_block_by_id(block_id) else {
            tracing::warn!("🚫 Unknown block id '{}'", block_id);
            return None;
        };
        self.add_node(block, position)
    }

    /// Remove nodes and every edge touching them
    ///
    /// Protected ids and unknown ids are filtered out first; when nothing is
    /// left the call is a no-op. Returns whether anything was removed.
    pub fn delete_nodes<I, S>(&mut self, node_ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed: HashSet<String> = node_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| !PROTECTED_NODE_IDS.contains(&id.as_str()))
            .filter(|id| {
                self.graph
                    .node(id)
                    .map(|n| n.node_type != START_NODE_TYPE)
                    .unwrap_or(false)
            })
            .collect();

        if doomed.is_empty() {
            return false;
        }

        self.snapshot();
        self.graph.nodes.retain(|n| !doomed.contains(&n.id));
        self.graph
            .edges
            .retain(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target));

        if self
            .selected
            .as_ref()
            .is_some_and(|n| doomed.contains(&n.id))
        {
            self.selected = None;
            self.selection_stale = false;
        }

        tracing::debug!("🗑️ Deleted {} node(s)", doomed.len());
        true
    }

    /// Remove edges by id; unknown ids are ignored
    pub fn delete_edges<I, S>(&mut self, edge_ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed: HashSet<String> = edge_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| self.graph.edges.iter().any(|e| &e.id == id))
            .collect();
        if doomed.is_empty() {
            return false;
        }
        self.snapshot();
        self.graph.edges.retain(|e| !doomed.contains(&e.id));
        true
    }

    /// Add an edge for a user-drawn connection
    ///
    /// Rejected (no-op) when an endpoint is missing, the target is the start
    /// node, source and target coincide, or the identical edge exists.
    /// Labels and colors come from the source block's edge decorator.
    pub fn connect(&mut self, connection: Connection) -> Option<String> {
        let Some(source) = self.graph.node(&connection.source) else {
            return None;
        };
        let Some(target) = self.graph.node(&connection.target) else {
            return None;
        };
        if target.is_start() || source.id == target.id {
            tracing::warn!(
                "🚫 Rejected connection {} → {}",
                connection.source,
                connection.target
            );
            return None;
        }

        let edge = build_edge(&self.catalog, Some(source), &connection);
        if self.graph.edges.iter().any(|e| e.id == edge.id) {
            return None;
        }

        self.snapshot();
        let id = edge.id.clone();
        self.graph.edges.push(edge);
        tracing::debug!("🔗 Connected {} → {}", connection.source, connection.target);
        Some(id)
    }

    /// Shallow-merge `partial` into a node's data
    ///
    /// The graph changes immediately; if the node is selected, the selection
    /// copy is refreshed on the next `flush_deferred`.
    pub fn update_node_data(&mut self, node_id: &str, partial: NodeData) -> bool {
        if !self.graph.contains_node(node_id) {
            return false;
        }
        self.snapshot();
        if let Some(node) = self.graph.node_mut(node_id) {
            node.data.extend(partial);
        }
        if self.selected.as_ref().is_some_and(|n| n.id == node_id) {
            self.selection_stale = true;
        }
        true
    }

    /// Move a node (end of a drag)
    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        match self.graph.node(node_id) {
            Some(node) if node.position != position => {}
            _ => return false,
        }
        self.snapshot();
        if let Some(node) = self.graph.node_mut(node_id) {
            node.position = position;
        }
        if self.selected.as_ref().is_some_and(|n| n.id == node_id) {
            self.selection_stale = true;
        }
        true
    }

    /// Select a node by id, or clear the selection with `None`
    pub fn select_node(&mut self, node_id: Option<&str>) -> bool {
        self.selection_stale = false;
        match node_id {
            Some(id) => match self.graph.node(id) {
                Some(node) => {
                    self.selected = Some(node.clone());
                    true
                }
                None => false,
            },
            None => {
                self.selected = None;
                true
            }
        }
    }

    /// Selected node as published to the UI
    pub fn selected_node(&self) -> Option<&GraphNode> {
        self.selected.as_ref()
    }

    pub fn has_deferred_work(&self) -> bool {
        self.selection_stale
    }

    /// Apply deferred selection refreshes
    ///
    /// Called by the host once the current batch of mutations has settled.
    pub fn flush_deferred(&mut self) {
        if !self.selection_stale {
            return;
        }
        self.selection_stale = false;
        self.selected = self
            .selected
            .as_ref()
            .and_then(|sel| self.graph.node(&sel.id).cloned());
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.graph) else {
            return false;
        };
        self.graph = previous;
        self.after_history_jump();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.graph) else {
            return false;
        };
        self.graph = next;
        self.after_history_jump();
        true
    }

    fn after_history_jump(&mut self) {
        if self.selected.is_some() {
            self.selection_stale = true;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the graph with a loaded one, resetting history and selection
    ///
    /// A graph without a start node gets the default one inserted.
    pub fn load(&mut self, mut graph: WorkflowGraph) {
        if graph.start_node().is_none() {
            graph.nodes.insert(0, start_node(&self.catalog));
        }
        self.graph = graph;
        self.history.clear();
        self.selected = None;
        self.selection_stale = false;
        tracing::info!(
            "📥 Loaded graph with {} nodes and {} edges",
            self.graph.nodes.len(),
            self.graph.edges.len()
        );
    }

    /// Persistence document for the current graph
    pub fn to_document(&self, draft: &WorkflowDraft) -> WorkflowDocument {
        WorkflowDocument::from_graph(&self.catalog, &self.graph, draft)
    }

    /// Local structural check of the current graph
    pub fn lint(&self) -> Vec<GraphIssue> {
        lint_graph(&self.graph)
    }
}

fn start_node(catalog: &BlockCatalog) -> GraphNode {
    let mut data = catalog
        .get_block_by_node_type(START_NODE_TYPE)
        .map(|b| {
            let mut data = b.default_data.clone();
            data.insert("blockId".into(), Value::String(b.id.clone()));
            data.insert("iconName".into(), Value::String(b.icon_name.clone()));
            data
        })
        .unwrap_or_default();
    data.entry("label")
        .or_insert_with(|| Value::String("Start".into()));

    GraphNode {
        id: START_NODE_ID.to_string(),
        node_type: START_NODE_TYPE.to_string(),
        position: START_NODE_POSITION,
        data,
    }
}
