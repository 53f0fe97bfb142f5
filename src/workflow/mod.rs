/// Workflow Model Layer
///
/// This module holds the workflow data model and its translations:
/// - Type definitions (canvas nodes/edges, backend wire format, documents)
/// - Canvas ↔ backend mapping
/// - Local structural lint with petgraph

// Core workflow type definitions
pub mod types;

// Canvas ↔ backend wire-format mapping
pub mod mapping;

// Structural pre-check (triggers, cycles, orphans)
pub mod lint;

// Re-export commonly used types
pub use lint::{lint_graph, GraphErrorKind, GraphIssue};
pub use types::{
    BackendEdge, BackendNode, Connection, GraphEdge, GraphNode, Position, WorkflowDetail,
    WorkflowDocument, WorkflowDraft, WorkflowGraph, WorkflowSummary,
};
