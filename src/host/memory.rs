use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Editor, SettingsStore, Workspace};
use crate::error::Result;
use crate::models::{Position, Selection};

/// A line-based in-memory text buffer.
pub struct MemoryEditor {
    state: Mutex<MemoryEditorState>,
}

struct MemoryEditorState {
    lines: Vec<String>,
    selection: Selection,
}

impl MemoryEditor {
    pub fn new(text: &str) -> Self {
        Self {
            state: Mutex::new(MemoryEditorState {
                lines: text.split('\n').map(String::from).collect(),
                selection: Selection::caret(Position::default()),
            }),
        }
    }

    pub fn text(&self) -> String {
        self.lock().lines.join("\n")
    }

    pub fn set_selection(&self, selection: Selection) {
        self.lock().selection = selection;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryEditorState> {
        // A panic while holding the lock leaves the lines intact, so keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryEditorState {
    fn clip(&self, pos: Position) -> Position {
        let last = self.lines.len().saturating_sub(1) as u32;
        if pos.line > last {
            return Position::new(last, self.lines[last as usize].chars().count() as u32);
        }
        let len = self.lines[pos.line as usize].chars().count() as u32;
        Position::new(pos.line, pos.ch.min(len))
    }

    fn byte_offset(&self, pos: Position) -> usize {
        let line = &self.lines[pos.line as usize];
        line.char_indices()
            .nth(pos.ch as usize)
            .map(|(offset, _)| offset)
            .unwrap_or(line.len())
    }

    fn text_between(&self, from: Position, to: Position) -> String {
        let from = self.clip(from);
        let to = self.clip(to).max(from);
        if from.line == to.line {
            let line = &self.lines[from.line as usize];
            return line[self.byte_offset(from)..self.byte_offset(to)].to_string();
        }

        let mut parts = Vec::with_capacity((to.line - from.line + 1) as usize);
        parts.push(&self.lines[from.line as usize][self.byte_offset(from)..]);
        for line in &self.lines[(from.line + 1) as usize..to.line as usize] {
            parts.push(line);
        }
        parts.push(&self.lines[to.line as usize][..self.byte_offset(to)]);
        parts.join("\n")
    }
}

impl Editor for MemoryEditor {
    fn selection(&self) -> Selection {
        self.lock().selection
    }

    fn selected_text(&self) -> String {
        let state = self.lock();
        state.text_between(state.selection.from, state.selection.to)
    }

    fn line(&self, line: u32) -> Option<String> {
        self.lock().lines.get(line as usize).cloned()
    }

    fn replace_range(&self, text: &str, from: Position, to: Option<Position>) {
        let mut state = self.lock();
        let from = state.clip(from);
        let to = state.clip(to.unwrap_or(from)).max(from);

        let prefix = &state.lines[from.line as usize][..state.byte_offset(from)];
        let suffix = &state.lines[to.line as usize][state.byte_offset(to)..];
        let joined = format!("{prefix}{text}{suffix}");
        let replacement: Vec<String> = joined.split('\n').map(String::from).collect();

        let tail = state.lines.split_off(to.line as usize + 1);
        state.lines.truncate(from.line as usize);
        state.lines.extend(replacement);
        state.lines.extend(tail);
    }
}

/// A workspace with at most one editor, which is always the active one.
#[derive(Default)]
pub struct SingleEditorWorkspace {
    editor: Mutex<Option<Arc<dyn Editor>>>,
}

impl SingleEditorWorkspace {
    pub fn new(editor: Arc<dyn Editor>) -> Self {
        Self {
            editor: Mutex::new(Some(editor)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_editor(&self, editor: Option<Arc<dyn Editor>>) {
        *self.editor.lock().unwrap_or_else(|e| e.into_inner()) = editor;
    }
}

impl Workspace for SingleEditorWorkspace {
    fn active_editor(&self) -> Option<Arc<dyn Editor>> {
        self.editor.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Keeps the plugin data blob in memory only.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Option<serde_json::Value>>,
}

impl MemoryStore {
    pub fn with_data(data: serde_json::Value) -> Self {
        Self {
            data: Mutex::new(Some(data)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_data(&self) -> Result<Option<serde_json::Value>> {
        Ok(self.data.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn save_data(&self, data: &serde_json::Value) -> Result<()> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = Some(data.clone());
        Ok(())
    }
}
