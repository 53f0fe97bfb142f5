/// Block Registry
///
/// Static catalog of the blocks a user can place on the canvas:
/// - Block definitions and category grouping
/// - Per-block backend config mappers
/// - Edge decorators for multi-output blocks
/// - The explicit built-in registration table

// Block definition types
pub mod types;

// Backend config projections (persisted vs transient fields)
pub mod mapper;

// Edge label/color strategies for if/switch blocks
pub mod decorators;

// Lookup indices over the definitions
pub mod catalog;

// Built-in registration table
pub mod builtin;

pub use catalog::{BlockCatalog, CatalogError};
pub use types::{block_id_to_backend_type, BlockDefinition, CategoryDefinition, ConfigComponentProps};
