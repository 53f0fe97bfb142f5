/// Canvas interaction layer
///
/// Viewport transforms, palette drops and keyboard shortcuts. Everything
/// here routes through `GraphEditor` operations; nothing touches the graph
/// directly.

use crate::editor::graph::GraphEditor;
use crate::workflow::types::Position;
use serde::{Deserialize, Serialize};

/// Rendered size of a node, used to center drops on the cursor
pub const NODE_WIDTH: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 80.0;

/// Pan/zoom state of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen-space offset of the canvas origin
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn screen_to_canvas(&self, screen: Position) -> Position {
        Position::new((screen.x - self.x) / self.zoom, (screen.y - self.y) / self.zoom)
    }

    pub fn canvas_to_screen(&self, canvas: Position) -> Position {
        Position::new(canvas.x * self.zoom + self.x, canvas.y * self.zoom + self.y)
    }
}

/// Drop a palette block at a screen point, centering the node on the cursor
pub fn drop_block(
    editor: &mut GraphEditor,
    viewport: &Viewport,
    block_id: &str,
    screen_point: Position,
) -> Option<String> {
    let at = viewport.screen_to_canvas(screen_point);
    let position = Position::new(at.x - NODE_WIDTH / 2.0, at.y - NODE_HEIGHT / 2.0);
    editor.add_node_by_id(block_id, position)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Escape,
}

/// A key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    /// Ctrl (or Cmd) + key
    pub fn command(c: char) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(Key::Char(c))
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What a handled shortcut did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    DeleteSelection,
    ClearSelection,
}

/// Apply a keyboard shortcut to the editor
///
/// Returns `None` when the chord is not a shortcut, when a text field has
/// focus (the field keeps its own undo and delete keys), or when the action
/// had nothing to do.
pub fn handle_shortcut(
    editor: &mut GraphEditor,
    chord: KeyChord,
    text_focused: bool,
) -> Option<ShortcutAction> {
    if text_focused {
        return None;
    }

    let action = match chord.key {
        Key::Char(c) if chord.is_command() => match c.to_ascii_lowercase() {
            'z' if chord.shift => ShortcutAction::Redo,
            'z' => ShortcutAction::Undo,
            'y' => ShortcutAction::Redo,
            _ => return None,
        },
        Key::Delete | Key::Backspace => ShortcutAction::DeleteSelection,
        Key::Escape => ShortcutAction::ClearSelection,
        Key::Char(_) => return None,
    };

    let applied = match action {
        ShortcutAction::Undo => editor.undo(),
        ShortcutAction::Redo => editor.redo(),
        ShortcutAction::DeleteSelection => match editor.selected_node().map(|n| n.id.clone()) {
            Some(id) => editor.delete_nodes([id]),
            None => false,
        },
        ShortcutAction::ClearSelection => {
            editor.selected_node().is_some() && editor.select_node(None)
        }
    };

    if applied {
        tracing::debug!("⌨️ Shortcut {:?}", action);
        Some(action)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockCatalog;
    use crate::workflow::types::START_NODE_ID;
    use std::sync::Arc;

    fn editor() -> GraphEditor {
        GraphEditor::new(Arc::new(BlockCatalog::builtin().unwrap()))
    }

    #[test]
    fn viewport_transforms_are_inverse() {
        let viewport = Viewport {
            x: 120.0,
            y: -40.0,
            zoom: 1.5,
        };
        let p = Position::new(300.0, 200.0);
        assert_eq!(viewport.canvas_to_screen(viewport.screen_to_canvas(p)), p);
        assert_eq!(viewport.screen_to_canvas(Position::new(120.0, -40.0)), Position::new(0.0, 0.0));
    }

    #[test]
    fn drop_centers_node_on_cursor() {
        let mut editor = editor();
        let viewport = Viewport {
            x: 100.0,
            y: 100.0,
            zoom: 2.0,
        };
        let id = drop_block(&mut editor, &viewport, "mail", Position::new(500.0, 300.0)).unwrap();
        let node = editor.graph().node(&id).unwrap();
        assert_eq!(node.position, Position::new(100.0, 60.0));
        assert!(drop_block(&mut editor, &viewport, "nope", Position::default()).is_none());
    }

    #[test]
    fn undo_and_redo_chords() {
        let mut editor = editor();
        editor.add_node_by_id("mail", Position::default());

        assert_eq!(handle_shortcut(&mut editor, KeyChord::command('z'), false), Some(ShortcutAction::Undo));
        assert_eq!(editor.nodes().len(), 1);
        assert_eq!(
            handle_shortcut(&mut editor, KeyChord::command('z').with_shift(), false),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(editor.nodes().len(), 2);

        editor.undo();
        let cmd_y = KeyChord {
            meta: true,
            ..KeyChord::plain(Key::Char('y'))
        };
        assert_eq!(handle_shortcut(&mut editor, cmd_y, false), Some(ShortcutAction::Redo));
    }

    #[test]
    fn shortcuts_are_ignored_while_typing() {
        let mut editor = editor();
        let id = editor.add_node_by_id("mail", Position::default()).unwrap();
        editor.select_node(Some(id.as_str()));
        assert_eq!(handle_shortcut(&mut editor, KeyChord::command('z'), true), None);
        assert_eq!(handle_shortcut(&mut editor, KeyChord::plain(Key::Backspace), true), None);
        assert_eq!(editor.nodes().len(), 2);
    }

    #[test]
    fn delete_key_removes_selected_node_but_not_start() {
        let mut editor = editor();
        let id = editor.add_node_by_id("mail", Position::default()).unwrap();
        editor.select_node(Some(id.as_str()));
        assert_eq!(
            handle_shortcut(&mut editor, KeyChord::plain(Key::Delete), false),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(editor.nodes().len(), 1);

        editor.select_node(Some(START_NODE_ID));
        assert_eq!(handle_shortcut(&mut editor, KeyChord::plain(Key::Delete), false), None);
        assert_eq!(editor.nodes().len(), 1);
    }

    #[test]
    fn escape_clears_selection() {
        let mut editor = editor();
        editor.select_node(Some(START_NODE_ID));
        assert_eq!(
            handle_shortcut(&mut editor, KeyChord::plain(Key::Escape), false),
            Some(ShortcutAction::ClearSelection)
        );
        assert!(editor.selected_node().is_none());
    }
}
