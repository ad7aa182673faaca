use serde::{Deserialize, Serialize};

/// A zero-based `(line, column)` location in a text buffer.
///
/// `ch` counts Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub ch: u32,
}

impl Position {
    pub const fn new(line: u32, ch: u32) -> Self {
        Self { line, ch }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub from: Position,
    pub to: Position,
}

impl Selection {
    /// Builds a selection from two positions in either order.
    pub fn new(anchor: Position, head: Position) -> Self {
        if anchor <= head {
            Self { from: anchor, to: head }
        } else {
            Self { from: head, to: anchor }
        }
    }

    pub fn caret(at: Position) -> Self {
        Self { from: at, to: at }
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}
