/// Local structural pre-check using petgraph
///
/// Mirrors the backend's graph-structure validation so obvious mistakes
/// (no trigger, loops, disconnected blocks) are reported without a network
/// round-trip. Messages are shared with the backend error classification so
/// the user sees the same sentence from either source.

use crate::workflow::types::WorkflowGraph;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::HashMap;

/// Kinds of graph-structure errors, local or backend-reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphErrorKind {
    MissingTrigger,
    MultipleTriggers,
    CircularDependency,
    OrphanedNodes,
    InvalidTemplateReference,
    DanglingEdge,
}

impl GraphErrorKind {
    /// Backend error code for this kind
    pub fn code(self) -> &'static str {
        match self {
            GraphErrorKind::MissingTrigger => "NO_TRIGGER_NODE",
            GraphErrorKind::MultipleTriggers => "MULTIPLE_TRIGGER_NODES",
            GraphErrorKind::CircularDependency => "CIRCULAR_DEPENDENCY",
            GraphErrorKind::OrphanedNodes => "ORPHANED_NODES",
            GraphErrorKind::InvalidTemplateReference => "INVALID_TEMPLATE_REFERENCE",
            GraphErrorKind::DanglingEdge => "INVALID_EDGE_REFERENCE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NO_TRIGGER_NODE" | "MISSING_TRIGGER" => Some(GraphErrorKind::MissingTrigger),
            "MULTIPLE_TRIGGER_NODES" | "MULTIPLE_TRIGGERS" => Some(GraphErrorKind::MultipleTriggers),
            "CIRCULAR_DEPENDENCY" => Some(GraphErrorKind::CircularDependency),
            "ORPHANED_NODES" => Some(GraphErrorKind::OrphanedNodes),
            "INVALID_TEMPLATE_REFERENCE" | "FORWARD_TEMPLATE_REFERENCE" => {
                Some(GraphErrorKind::InvalidTemplateReference)
            }
            "INVALID_EDGE_REFERENCE" => Some(GraphErrorKind::DanglingEdge),
            _ => None,
        }
    }

    /// Human-readable sentence shown in the editor banner
    pub fn sentence(self) -> &'static str {
        match self {
            GraphErrorKind::MissingTrigger => {
                "Your workflow needs a trigger. Add a start block to define how it begins."
            }
            GraphErrorKind::MultipleTriggers => {
                "Your workflow has more than one trigger. Keep a single start block."
            }
            GraphErrorKind::CircularDependency => {
                "Your workflow contains a loop. Remove the connection that leads back to an earlier block."
            }
            GraphErrorKind::OrphanedNodes => {
                "Some blocks are not connected to the workflow. Connect them to the flow or remove them."
            }
            GraphErrorKind::InvalidTemplateReference => {
                "A block references output from a block that runs after it. Only reference blocks that run earlier."
            }
            GraphErrorKind::DanglingEdge => "A connection points to a block that no longer exists.",
        }
    }
}

/// One structural problem found locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphIssue {
    pub kind: GraphErrorKind,
    /// Offending node ids, where the kind has any
    pub node_ids: Vec<String>,
}

impl GraphIssue {
    fn new(kind: GraphErrorKind, node_ids: Vec<String>) -> Self {
        Self { kind, node_ids }
    }

    pub fn message(&self) -> &'static str {
        self.kind.sentence()
    }
}

/// Structural issues of `graph`; empty means structurally sound
pub fn lint_graph(graph: &WorkflowGraph) -> Vec<GraphIssue> {
    let mut issues = Vec::new();

    let mut dag: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for node in &graph.nodes {
        index.insert(node.id.as_str(), dag.add_node(node.id.as_str()));
    }

    let mut dangling = Vec::new();
    for edge in &graph.edges {
        match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
            (Some(&from), Some(&to)) => {
                dag.add_edge(from, to, ());
            }
            _ => dangling.push(edge.id.clone()),
        }
    }
    if !dangling.is_empty() {
        issues.push(GraphIssue::new(GraphErrorKind::DanglingEdge, dangling));
    }

    let triggers: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.is_start())
        .map(|n| n.id.as_str())
        .collect();
    match triggers.len() {
        0 => issues.push(GraphIssue::new(GraphErrorKind::MissingTrigger, vec![])),
        1 => {}
        _ => issues.push(GraphIssue::new(
            GraphErrorKind::MultipleTriggers,
            triggers.iter().map(|t| t.to_string()).collect(),
        )),
    }

    if let Err(cycle) = toposort(&dag, None) {
        issues.push(GraphIssue::new(
            GraphErrorKind::CircularDependency,
            vec![dag[cycle.node_id()].to_string()],
        ));
    }

    if let Some(&trigger) = triggers.first() {
        let mut reachable = vec![false; dag.node_count()];
        let mut dfs = Dfs::new(&dag, index[trigger]);
        while let Some(visited) = dfs.next(&dag) {
            reachable[visited.index()] = true;
        }
        let orphans: Vec<String> = dag
            .node_indices()
            .filter(|i| !reachable[i.index()])
            .map(|i| dag[i].to_string())
            .filter(|id| !triggers.contains(&id.as_str()))
            .collect();
        if !orphans.is_empty() {
            issues.push(GraphIssue::new(GraphErrorKind::OrphanedNodes, orphans));
        }
    }

    if !issues.is_empty() {
        tracing::debug!("🔍 Local lint found {} structural issue(s)", issues.len());
    }
    issues
}
