/// Block catalog with O(1) id and node-type lookups
///
/// Built once at startup and shared with the editor, the mapping layer and
/// the API client through an `Arc`. Indices are built in the constructor, so
/// the first lookup costs the same as every other.

use crate::blocks::{
    builtin::{self, CATEGORY_LABELS},
    types::{block_id_to_backend_type, BlockDefinition, CategoryDefinition},
};
use std::collections::HashMap;
use thiserror::Error;

/// Catalog construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate block id: '{0}'")]
    DuplicateBlockId(String),

    #[error("node type '{node_type}' is claimed by both '{first}' and '{second}'")]
    DuplicateNodeType {
        node_type: String,
        first: String,
        second: String,
    },
}

/// Immutable catalog of block definitions
#[derive(Debug)]
pub struct BlockCatalog {
    /// Definitions in registration order
    blocks: Vec<BlockDefinition>,
    /// Key: block id, Value: index into `blocks`
    by_id: HashMap<String, usize>,
    /// Key: node type, Value: index into `blocks`
    by_node_type: HashMap<String, usize>,
    /// Key: backend type, Value: frontend node type
    by_backend_type: HashMap<String, String>,
}

impl BlockCatalog {
    /// Build a catalog, rejecting duplicate ids and node types
    pub fn new(definitions: Vec<BlockDefinition>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(definitions.len());
        let mut by_node_type: HashMap<String, usize> = HashMap::with_capacity(definitions.len());
        let mut by_backend_type = HashMap::with_capacity(definitions.len());

        for (index, block) in definitions.iter().enumerate() {
            if by_id.insert(block.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateBlockId(block.id.clone()));
            }
            if let Some(&first) = by_node_type.get(&block.node_type) {
                return Err(CatalogError::DuplicateNodeType {
                    node_type: block.node_type.clone(),
                    first: definitions[first].id.clone(),
                    second: block.id.clone(),
                });
            }
            by_node_type.insert(block.node_type.clone(), index);
            by_backend_type
                .entry(block.resolved_backend_type())
                .or_insert_with(|| block.node_type.clone());
        }

        tracing::debug!("📦 Block catalog built with {} blocks", definitions.len());

        Ok(Self {
            blocks: definitions,
            by_id,
            by_node_type,
            by_backend_type,
        })
    }

    /// Catalog of the blocks the builder ships with
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin::definitions())
    }

    pub fn get_block_by_id(&self, id: &str) -> Option<&BlockDefinition> {
        self.by_id.get(id).map(|&i| &self.blocks[i])
    }

    pub fn get_block_by_node_type(&self, node_type: &str) -> Option<&BlockDefinition> {
        self.by_node_type.get(node_type).map(|&i| &self.blocks[i])
    }

    pub fn get_all_blocks(&self) -> &[BlockDefinition] {
        &self.blocks
    }

    pub fn get_blocks_by_category(&self, category: &str) -> Vec<&BlockDefinition> {
        self.blocks.iter().filter(|b| b.category == category).collect()
    }

    /// Palette categories of non-hidden blocks
    ///
    /// Known categories come first in table order; unknown ones follow in
    /// registration order with a capitalized id as label.
    pub fn get_categories(&self) -> Vec<CategoryDefinition<'_>> {
        let mut categories: Vec<CategoryDefinition<'_>> = Vec::new();
        for block in self.blocks.iter().filter(|b| !b.hidden) {
            match categories.iter_mut().find(|c| c.id == block.category) {
                Some(category) => category.blocks.push(block),
                None => categories.push(CategoryDefinition {
                    id: block.category.clone(),
                    label: category_label(&block.category),
                    blocks: vec![block],
                }),
            }
        }
        categories.sort_by_key(|c| {
            CATEGORY_LABELS
                .iter()
                .position(|(id, _)| *id == c.id)
                .unwrap_or(CATEGORY_LABELS.len())
        });
        categories
    }

    /// Backend processor name for a frontend node type
    pub fn backend_type_for(&self, node_type: &str) -> String {
        self.get_block_by_node_type(node_type)
            .map(BlockDefinition::resolved_backend_type)
            .unwrap_or_else(|| block_id_to_backend_type(node_type))
    }

    /// Frontend node type registered for a backend processor name
    pub fn node_type_for_backend(&self, backend_type: &str) -> Option<&str> {
        self.by_backend_type.get(backend_type).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Palette label for a category id
pub fn category_label(category: &str) -> String {
    if let Some((_, label)) = CATEGORY_LABELS.iter().find(|(id, _)| *id == category) {
        return label.to_string();
    }
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
