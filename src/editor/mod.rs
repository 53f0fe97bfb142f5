/// Editor Layer
///
/// The single-writer graph model and the interaction surface around it:
/// - Bounded undo/redo history of deep-copied snapshots
/// - `GraphEditor`, the only mutator of nodes and edges
/// - Viewport, drop placement and keyboard shortcuts

// Snapshot history
pub mod history;

// Graph state model
pub mod graph;

// Canvas interaction
pub mod canvas;

pub use canvas::{drop_block, handle_shortcut, Key, KeyChord, ShortcutAction, Viewport};
pub use graph::GraphEditor;
pub use history::{History, DEFAULT_HISTORY_LIMIT};
