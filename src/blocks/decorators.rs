/// Edge decorators for multi-output blocks
///
/// A block with several output handles owns the strategy that labels and
/// colors edges leaving those handles. The editor's `connect` only asks the
/// source block's decorator; it never special-cases block types.

use crate::workflow::types::GraphNode;
use serde_json::Value;
use std::fmt;

pub const TRUE_BRANCH_COLOR: &str = "#22c55e";
pub const FALSE_BRANCH_COLOR: &str = "#ef4444";
pub const DEFAULT_CASE_COLOR: &str = "#6b7280";

/// Colors for non-default switch cases, cycled by case index
pub const CASE_PALETTE: &[&str] = &["#3b82f6", "#a855f7", "#f59e0b", "#14b8a6"];

/// Label and color for one decorated edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDecoration {
    pub label: String,
    pub color: String,
}

impl EdgeDecoration {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

pub trait EdgeDecorator: Send + Sync + fmt::Debug {
    /// Decoration for an edge leaving `source` through `source_handle`;
    /// `None` yields a plain unlabeled edge
    fn decorate(&self, source: &GraphNode, source_handle: Option<&str>) -> Option<EdgeDecoration>;
}

/// "if" block: `true` / `false` handles
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalBranches;

impl EdgeDecorator for ConditionalBranches {
    fn decorate(&self, _source: &GraphNode, source_handle: Option<&str>) -> Option<EdgeDecoration> {
        match source_handle? {
            "true" => Some(EdgeDecoration::new("True", TRUE_BRANCH_COLOR)),
            "false" => Some(EdgeDecoration::new("False", FALSE_BRANCH_COLOR)),
            _ => None,
        }
    }
}

/// One configured switch case as stored in node data
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub id: String,
    pub label: String,
    pub is_default: bool,
}

/// Switch cases from node data, default case first
pub fn switch_cases(node: &GraphNode) -> Vec<SwitchCase> {
    let mut cases: Vec<SwitchCase> = node
        .data
        .get("cases")
        .and_then(Value::as_array)
        .map(|cases| {
            cases
                .iter()
                .filter_map(|c| {
                    let id = c.get("id")?.as_str()?.to_string();
                    let label = c
                        .get("label")
                        .and_then(Value::as_str)
                        .unwrap_or(&id)
                        .to_string();
                    let is_default = c.get("isDefault").and_then(Value::as_bool).unwrap_or(false);
                    Some(SwitchCase { id, label, is_default })
                })
                .collect()
        })
        .unwrap_or_default();
    // stable: non-default cases keep their configured order
    cases.sort_by_key(|c| !c.is_default);
    cases
}

/// "switch" block: one handle per configured case id
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchCases;

impl EdgeDecorator for SwitchCases {
    fn decorate(&self, source: &GraphNode, source_handle: Option<&str>) -> Option<EdgeDecoration> {
        let handle = source_handle?;
        let mut non_default_index = 0usize;
        for case in switch_cases(source) {
            if case.is_default {
                if case.id == handle {
                    return Some(EdgeDecoration::new(case.label, DEFAULT_CASE_COLOR));
                }
                continue;
            }
            if case.id == handle {
                let color = CASE_PALETTE[non_default_index % CASE_PALETTE.len()];
                return Some(EdgeDecoration::new(case.label, color));
            }
            non_default_index += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::Position;
    use serde_json::json;

    fn switch_node(cases: Value) -> GraphNode {
        GraphNode {
            id: "switch-1".into(),
            node_type: "switch".into(),
            position: Position::default(),
            data: json!({ "cases": cases }).as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn conditional_handles_map_to_true_and_false() {
        let node = switch_node(json!([]));
        let t = ConditionalBranches.decorate(&node, Some("true")).unwrap();
        assert_eq!(t, EdgeDecoration::new("True", TRUE_BRANCH_COLOR));
        let f = ConditionalBranches.decorate(&node, Some("false")).unwrap();
        assert_eq!(f, EdgeDecoration::new("False", FALSE_BRANCH_COLOR));
        assert!(ConditionalBranches.decorate(&node, None).is_none());
    }

    #[test]
    fn default_case_is_gray_wherever_it_is_configured() {
        let node = switch_node(json!([
            { "id": "a", "label": "Above" },
            { "id": "b", "label": "Below" },
            { "id": "d", "label": "Otherwise", "isDefault": true }
        ]));
        let d = SwitchCases.decorate(&node, Some("d")).unwrap();
        assert_eq!(d.color, DEFAULT_CASE_COLOR);
        assert_eq!(d.label, "Otherwise");
    }

    #[test]
    fn non_default_cases_cycle_the_palette_by_index() {
        let node = switch_node(json!([
            { "id": "c0", "label": "0" },
            { "id": "def", "label": "Default", "isDefault": true },
            { "id": "c1", "label": "1" },
            { "id": "c2", "label": "2" },
            { "id": "c3", "label": "3" },
            { "id": "c4", "label": "4" }
        ]));
        assert_eq!(SwitchCases.decorate(&node, Some("c0")).unwrap().color, CASE_PALETTE[0]);
        assert_eq!(SwitchCases.decorate(&node, Some("c1")).unwrap().color, CASE_PALETTE[1]);
        assert_eq!(SwitchCases.decorate(&node, Some("c4")).unwrap().color, CASE_PALETTE[0]);
        assert!(SwitchCases.decorate(&node, Some("missing")).is_none());
    }

    #[test]
    fn switch_cases_sort_default_first() {
        let node = switch_node(json!([
            { "id": "x" },
            { "id": "d", "isDefault": true }
        ]));
        let ids: Vec<_> = switch_cases(&node).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["d", "x"]);
    }
}
