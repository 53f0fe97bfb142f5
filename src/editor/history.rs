/// Undo/redo history of graph snapshots
///
/// Snapshots are owned deep copies of the graph, so later edits to the live
/// graph can never reach into a stored snapshot.

use crate::workflow::types::WorkflowGraph;
use std::collections::VecDeque;

/// Default bound on the undo stack
pub const DEFAULT_HISTORY_LIMIT: usize = 128;

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<WorkflowGraph>,
    redo: Vec<WorkflowGraph>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the pre-mutation state; any pending redo is discarded
    pub fn record(&mut self, snapshot: WorkflowGraph) {
        self.undo.push_back(snapshot);
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Swap `current` for the most recent undo snapshot
    pub fn undo(&mut self, current: &WorkflowGraph) -> Option<WorkflowGraph> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    /// Swap `current` for the most recent redo snapshot
    pub fn redo(&mut self, current: &WorkflowGraph) -> Option<WorkflowGraph> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{GraphNode, Position};

    fn graph_with(ids: &[&str]) -> WorkflowGraph {
        WorkflowGraph {
            nodes: ids
                .iter()
                .map(|id| GraphNode {
                    id: id.to_string(),
                    node_type: "mail".into(),
                    position: Position::default(),
                    data: Default::default(),
                })
                .collect(),
            edges: vec![],
        }
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::default();
        history.record(graph_with(&["a"]));
        history.undo(&graph_with(&["a", "b"])).unwrap();
        assert!(history.can_redo());
        history.record(graph_with(&["a"]));
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_stack_is_bounded() {
        let mut history = History::with_limit(3);
        for i in 0..5 {
            history.record(graph_with(&[&i.to_string()]));
        }
        assert_eq!(history.undo_len(), 3);
        // oldest snapshots were evicted
        let latest = history.undo(&graph_with(&[])).unwrap();
        assert_eq!(latest.nodes[0].id, "4");
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut history = History::default();
        assert!(history.undo(&graph_with(&[])).is_none());
        assert!(history.redo(&graph_with(&[])).is_none());
        assert_eq!(history.redo_len(), 0);
    }
}
