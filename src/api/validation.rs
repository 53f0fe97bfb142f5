/// Validation response classification
///
/// The backend reports two families of problems: schema errors on single
/// node configs (`nodes.1.config.swapProvider is required`) and errors in
/// the graph's structure. Schema errors are grouped per block with
/// humanized field names; structural errors become a fixed sentence.

use crate::workflow::lint::GraphErrorKind;
use crate::workflow::types::WorkflowGraph;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{field_details, ErrorDetail};

/// Fields listed per block before the summary switches to "+N more"
pub const MAX_FIELDS_PER_BLOCK: usize = 4;

/// Outcome of `validate_workflow`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_details: Option<Value>,
}

/// A schema error pinned to one node's config field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Index into the submitted node list
    pub node_index: usize,
    /// Id of the node at that index, when the graph still has it
    pub node_id: Option<String>,
    /// Raw config field name
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: "Workflow is valid".to_string(),
            error_code: None,
            field_errors: Vec::new(),
            graph_details: None,
        }
    }

    /// Classify a backend validation failure against the submitted graph
    pub fn from_failure(graph: &WorkflowGraph, code: &str, message: &str, details: &Value) -> Self {
        let detail_list = field_details(details);
        let field_errors = collect_field_errors(graph, &detail_list);

        let (message, graph_details) = if !field_errors.is_empty() {
            (summarize_field_errors(graph, &field_errors), None)
        } else if let Some(kind) = GraphErrorKind::from_code(code) {
            let details = (!details.is_null()).then(|| details.clone());
            (kind.sentence().to_string(), details)
        } else if message.is_empty() {
            ("Workflow validation failed".to_string(), None)
        } else {
            (message.to_string(), None)
        };

        Self {
            valid: false,
            message,
            error_code: (!code.is_empty()).then(|| code.to_string()),
            field_errors,
            graph_details,
        }
    }
}

/// `(node index, config field)` of a Joi path such as `nodes.1.config.to`
/// or `nodes[1].config.to`
pub fn parse_field_path(path: &str) -> Option<(usize, String)> {
    let normalized = path.replace('[', ".").replace(']', "");
    let mut parts = normalized.split('.').filter(|p| !p.is_empty());
    if parts.next()? != "nodes" {
        return None;
    }
    let index = parts.next()?.parse().ok()?;
    let field = match parts.next()? {
        "config" => parts.next()?,
        other => other,
    };
    Some((index, field.to_string()))
}

fn collect_field_errors(graph: &WorkflowGraph, details: &[ErrorDetail]) -> Vec<FieldError> {
    details
        .iter()
        .filter_map(|detail| {
            let (node_index, field) = parse_field_path(detail.field.as_deref()?)?;
            Some(FieldError {
                node_index,
                node_id: graph.nodes.get(node_index).map(|n| n.id.clone()),
                field,
                message: detail.message.clone(),
            })
        })
        .collect()
}

/// Display names for config fields shared across blocks
const FIELD_LABELS: &[(&str, &str)] = &[
    ("to", "Recipient"),
    ("subject", "Subject"),
    ("body", "Body"),
    ("connectionId", "Connection"),
    ("channelId", "Channel"),
    ("chatId", "Chat"),
    ("message", "Message"),
    ("walletAddress", "Wallet Address"),
    ("aggregatorAddress", "Aggregator Address"),
    ("priceFeedId", "Price Feed"),
    ("oracleChain", "Chain"),
    ("leftPath", "Left Value"),
    ("rightValue", "Right Value"),
    ("durationSeconds", "Duration"),
    ("sourceToken", "Source Token"),
    ("destinationToken", "Destination Token"),
];

/// User-facing name of a config field
///
/// Known fields use a fixed label. Otherwise the node-type prefix is
/// stripped (`swapProvider` on a swap node → `Provider`) and the rest is
/// split on camelCase boundaries.
pub fn humanize_field_name(field: &str, node_type: Option<&str>) -> String {
    if let Some((_, label)) = FIELD_LABELS.iter().find(|(name, _)| *name == field) {
        return label.to_string();
    }

    let mut name = field;
    if let Some(prefix) = node_type {
        if let (Some(head), Some(rest)) = (name.get(..prefix.len()), name.get(prefix.len()..)) {
            if head.eq_ignore_ascii_case(prefix) && rest.starts_with(|c: char| c.is_ascii_uppercase()) {
                name = rest;
            }
        }
    }

    let mut words: Vec<String> = Vec::new();
    for c in name.chars() {
        match words.last_mut() {
            Some(word) if !(c.is_ascii_uppercase() || c == '_' || c == '-') => word.push(c),
            _ => {
                if c != '_' && c != '-' {
                    words.push(c.to_string());
                } else {
                    words.push(String::new());
                }
            }
        }
    }
    words
        .into_iter()
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per block: `"{label} → missing A, B, C, D +N more"`
pub fn summarize_field_errors(graph: &WorkflowGraph, errors: &[FieldError]) -> String {
    let mut groups: Vec<(usize, Vec<String>)> = Vec::new();
    for error in errors {
        let node_type = graph.nodes.get(error.node_index).map(|n| n.node_type.as_str());
        let name = humanize_field_name(&error.field, node_type);
        match groups.iter_mut().find(|(index, _)| *index == error.node_index) {
            Some((_, names)) => {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            None => groups.push((error.node_index, vec![name])),
        }
    }

    groups
        .into_iter()
        .map(|(index, names)| {
            let label = graph
                .nodes
                .get(index)
                .map(|n| n.label().to_string())
                .unwrap_or_else(|| format!("Block {}", index + 1));
            let shown = names
                .iter()
                .take(MAX_FIELDS_PER_BLOCK)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if names.len() > MAX_FIELDS_PER_BLOCK {
                format!("{} → missing {} +{} more", label, shown, names.len() - MAX_FIELDS_PER_BLOCK)
            } else {
                format!("{} → missing {}", label, shown)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
