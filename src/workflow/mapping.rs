/// Canvas ↔ backend mapping
///
/// Pure functions translating editor nodes and edges into the backend's
/// persisted workflow schema and back. Per-block config projection is
/// delegated to the block's `ConfigMapper`; edge labels on load are rebuilt
/// through the source block's `EdgeDecorator`, exactly as `connect` does.

use crate::blocks::BlockCatalog;
use crate::workflow::types::{
    BackendEdge, BackendNode, Connection, EdgeStyle, GraphEdge, GraphNode, LabelStyle,
    NodeMetadata, WorkflowDetail, WorkflowDocument, WorkflowDraft, WorkflowGraph, START_NODE_ID,
    START_NODE_TYPE,
};
use serde_json::{Map, Value};

/// Fields passed through for node types without a registered mapper
const GENERIC_FIELDS: &[&str] = &["leftPath", "operator", "rightValue"];

/// Backend processor name for a frontend node type
pub fn normalize_node_type(catalog: &BlockCatalog, frontend_type: &str) -> String {
    catalog.backend_type_for(frontend_type)
}

/// Backend `config` for a node
pub fn extract_node_config(catalog: &BlockCatalog, node: &GraphNode) -> Map<String, Value> {
    if let Some(mapper) = catalog
        .get_block_by_node_type(&node.node_type)
        .and_then(|b| b.mapper.as_ref())
    {
        return mapper.persisted_config(&node.data);
    }

    tracing::debug!("🔧 No config mapper for node type '{}', using generic fields", node.node_type);
    GENERIC_FIELDS
        .iter()
        .filter_map(|field| {
            node.data
                .get(*field)
                .filter(|v| !v.is_null())
                .map(|v| (field.to_string(), v.clone()))
        })
        .collect()
}

fn data_str(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Full backend wire node for a canvas node
pub fn to_backend_node(catalog: &BlockCatalog, node: &GraphNode) -> BackendNode {
    let block = catalog.get_block_by_node_type(&node.node_type);
    BackendNode {
        id: node.id.clone(),
        node_type: normalize_node_type(catalog, &node.node_type),
        name: Some(node.label().to_string()),
        description: data_str(&node.data, "description").unwrap_or_default(),
        config: extract_node_config(catalog, node),
        position: node.position,
        metadata: NodeMetadata {
            block_id: data_str(&node.data, "blockId").or_else(|| block.map(|b| b.id.clone())),
            icon_name: data_str(&node.data, "iconName")
                .or_else(|| block.map(|b| b.icon_name.clone())),
            status: data_str(&node.data, "status"),
            frontend_type: Some(node.node_type.clone()),
        },
    }
}

pub fn to_backend_edge(edge: &GraphEdge) -> BackendEdge {
    BackendEdge {
        source_node_id: edge.source.clone(),
        target_node_id: edge.target.clone(),
        source_handle: edge.source_handle.clone(),
        target_handle: edge.target_handle.clone(),
        condition: Map::new(),
        data_mapping: Map::new(),
    }
}

/// Serialized nodes and edges, ready for validate/create/save bodies
pub fn to_backend_graph(
    catalog: &BlockCatalog,
    graph: &WorkflowGraph,
) -> (Vec<BackendNode>, Vec<BackendEdge>) {
    let nodes = graph.nodes.iter().map(|n| to_backend_node(catalog, n)).collect();
    let edges = graph.edges.iter().map(to_backend_edge).collect();
    (nodes, edges)
}

/// Id of the graph's trigger node
pub fn trigger_node_id(graph: &WorkflowGraph) -> String {
    graph
        .start_node()
        .map(|n| n.id.clone())
        .unwrap_or_else(|| START_NODE_ID.to_string())
}

impl WorkflowDocument {
    /// Persistence document for a graph plus caller metadata
    pub fn from_graph(catalog: &BlockCatalog, graph: &WorkflowGraph, draft: &WorkflowDraft) -> Self {
        let (nodes, edges) = to_backend_graph(catalog, graph);
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            tags: draft.tags.clone(),
            nodes,
            edges,
            trigger_node_id: trigger_node_id(graph),
            category: draft.category.clone(),
            is_public: draft.is_public,
            version: None,
        }
    }
}

/// Frontend node type for a backend node
///
/// `metadata.frontendType` wins; then the catalog's reverse table; then the
/// lowercased backend type.
pub fn resolve_frontend_type(catalog: &BlockCatalog, backend_node: &BackendNode) -> String {
    if let Some(frontend) = &backend_node.metadata.frontend_type {
        return frontend.clone();
    }
    catalog
        .node_type_for_backend(&backend_node.node_type)
        .map(str::to_string)
        .unwrap_or_else(|| backend_node.node_type.to_lowercase())
}

/// Inverse of `to_backend_node`
pub fn transform_node_to_canvas(catalog: &BlockCatalog, backend_node: &BackendNode) -> GraphNode {
    let node_type = resolve_frontend_type(catalog, backend_node);
    let block = catalog.get_block_by_node_type(&node_type);

    let mut data = match block.and_then(|b| b.mapper.as_ref()) {
        Some(mapper) => mapper.restored_data(&backend_node.config),
        None => backend_node.config.clone(),
    };

    let label = backend_node
        .name
        .clone()
        .unwrap_or_else(|| backend_node.id.clone());
    data.insert("label".into(), Value::String(label));
    if !backend_node.description.is_empty() {
        data.insert("description".into(), Value::String(backend_node.description.clone()));
    }

    let meta = &backend_node.metadata;
    if let Some(block_id) = meta.block_id.clone().or_else(|| block.map(|b| b.id.clone())) {
        data.insert("blockId".into(), Value::String(block_id));
    }
    if let Some(icon) = meta.icon_name.clone().or_else(|| block.map(|b| b.icon_name.clone())) {
        data.insert("iconName".into(), Value::String(icon));
    }
    if let Some(status) = &meta.status {
        data.insert("status".into(), Value::String(status.clone()));
    }

    GraphNode {
        id: backend_node.id.clone(),
        node_type,
        position: backend_node.position,
        data,
    }
}

/// Canvas edge for a connection, decorated by the source block
pub fn build_edge(catalog: &BlockCatalog, source: Option<&GraphNode>, connection: &Connection) -> GraphEdge {
    let decoration = source.and_then(|node| {
        catalog
            .get_block_by_node_type(&node.node_type)
            .and_then(|b| b.edge_decorator.as_ref())
            .and_then(|d| d.decorate(node, connection.source_handle.as_deref()))
    });

    let mut edge = GraphEdge {
        id: GraphEdge::id_for(
            &connection.source,
            connection.source_handle.as_deref(),
            &connection.target,
            connection.target_handle.as_deref(),
        ),
        source: connection.source.clone(),
        target: connection.target.clone(),
        source_handle: connection.source_handle.clone(),
        target_handle: connection.target_handle.clone(),
        label: None,
        style: None,
        label_style: None,
    };
    if let Some(decoration) = decoration {
        edge.style = Some(EdgeStyle {
            stroke: decoration.color.clone(),
        });
        edge.label_style = Some(LabelStyle {
            fill: decoration.color,
        });
        edge.label = Some(decoration.label);
    }
    edge
}

/// Inverse of `to_backend_edge`; `nodes` are the already-transformed canvas nodes
pub fn transform_edge_to_canvas(
    catalog: &BlockCatalog,
    nodes: &[GraphNode],
    backend_edge: &BackendEdge,
) -> GraphEdge {
    let connection = Connection {
        source: backend_edge.source_node_id.clone(),
        target: backend_edge.target_node_id.clone(),
        source_handle: backend_edge.source_handle.clone(),
        target_handle: backend_edge.target_handle.clone(),
    };
    let source = nodes.iter().find(|n| n.id == connection.source);
    build_edge(catalog, source, &connection)
}

/// Rebuild the canvas graph of a persisted workflow
///
/// The trigger node becomes the canvas start node under the protected
/// `START_NODE_ID`, with its edges rewritten to match. A stored node that
/// already uses that id without being the trigger is dropped. Edges whose
/// endpoints did not survive the load are dropped.
pub fn transform_workflow_to_canvas(catalog: &BlockCatalog, detail: &WorkflowDetail) -> WorkflowGraph {
    let mut nodes: Vec<GraphNode> = detail
        .nodes
        .iter()
        .map(|n| transform_node_to_canvas(catalog, n))
        .collect();

    let trigger_id = detail
        .trigger_node_id
        .as_deref()
        .filter(|id| nodes.iter().any(|n| n.id == *id));

    let mut displaced = None;
    if let Some(trigger_id) = trigger_id {
        if trigger_id != START_NODE_ID && nodes.iter().any(|n| n.id == START_NODE_ID) {
            tracing::warn!(
                "⚠️ Workflow {} stores a non-trigger node as '{}'; dropping it",
                detail.id,
                START_NODE_ID
            );
            nodes.retain(|n| n.id != START_NODE_ID);
            displaced = Some(START_NODE_ID);
        }
        if let Some(node) = nodes.iter_mut().find(|n| n.id == trigger_id) {
            node.id = START_NODE_ID.to_string();
            node.node_type = START_NODE_TYPE.to_string();
        }
    }
    let canonical = |id: &str| -> String {
        if Some(id) == trigger_id {
            START_NODE_ID.to_string()
        } else {
            id.to_string()
        }
    };

    let edges: Vec<GraphEdge> = detail
        .edges
        .iter()
        .filter(|e| displaced.map_or(true, |d| e.source_node_id != d && e.target_node_id != d))
        .map(|e| BackendEdge {
            source_node_id: canonical(e.source_node_id.as_str()),
            target_node_id: canonical(e.target_node_id.as_str()),
            ..e.clone()
        })
        .filter(|e| {
            let ok = nodes.iter().any(|n| n.id == e.source_node_id)
                && nodes.iter().any(|n| n.id == e.target_node_id);
            if !ok {
                tracing::warn!(
                    "⚠️ Dropping edge {} → {} from workflow {}: endpoint missing",
                    e.source_node_id,
                    e.target_node_id,
                    detail.id
                );
            }
            ok
        })
        .map(|e| transform_edge_to_canvas(catalog, &nodes, &e))
        .collect();

    tracing::debug!(
        "📥 Transformed workflow {} to canvas: {} nodes, {} edges",
        detail.id,
        nodes.len(),
        edges.len()
    );

    WorkflowGraph { nodes, edges }
}
