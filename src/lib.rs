/// blockflow: workflow graph editor core for visual DeFi automation
///
/// This library provides the block catalog, the undoable workflow graph,
/// the canvas ↔ backend mapping, the workflow backend client and the
/// Safe-wallet signing flow.

// Core configuration and setup
pub mod config;

// Block registry - catalog of placeable blocks, config mappers, edge decorators
pub mod blocks;

// Workflow model layer - canvas and backend types, mapping, structural lint
pub mod workflow;

// Editor layer - graph state model, history, canvas interaction
pub mod editor;

// Persistence client - validate/save/execute/load and the execution event stream
pub mod api;

// Signing flow for paused Safe executions
pub mod signing;

// Re-export commonly used types for external consumers
pub use api::{ApiError, ValidationReport, WorkflowClient};
pub use blocks::{BlockCatalog, BlockDefinition};
pub use editor::GraphEditor;
pub use signing::{SigningError, SigningFlow};
pub use workflow::{Connection, GraphEdge, GraphNode, Position, WorkflowGraph};
