//! Writes a streamed completion into a live buffer at an advancing cursor.
//!
//! The cursor is threaded through the loop as a plain value: each chunk is inserted at
//! the current cursor and produces the next one. After chunk `k` the cursor sits
//! immediately after everything chunks `1..=k` inserted.

use crate::error::Result;
use crate::host::Editor;
use crate::models::{Position, Selection};
use crate::services::llm_client::ChunkStream;

/// Status text shown in place of the selection until the first chunk arrives.
pub const PLACEHOLDER: &str = "⏳ Generating response...";

/// Where the cursor lands after inserting `chunk` at `cursor`.
///
/// Without a newline the column advances by the chunk's length. Otherwise the line
/// advances by the number of newlines and the column is the length of the text after
/// the last one.
pub fn advance(cursor: Position, chunk: &str) -> Position {
    match chunk.rfind('\n') {
        None => Position::new(cursor.line, cursor.ch + char_len(chunk)),
        Some(last_newline) => {
            let newlines = chunk.matches('\n').count() as u32;
            Position::new(cursor.line + newlines, char_len(&chunk[last_newline + 1..]))
        }
    }
}

/// Inserts `chunk` at `cursor` and returns the advanced cursor.
pub fn apply_chunk(editor: &dyn Editor, cursor: Position, chunk: &str) -> Position {
    editor.replace_range(chunk, cursor, None);
    advance(cursor, chunk)
}

/// Drains `chunks` into `editor` starting at `start`, in arrival order.
///
/// Returns the final cursor. On failure the error is returned as-is; text inserted
/// before it stays in the buffer.
pub async fn stream_into(
    editor: &dyn Editor,
    start: Position,
    chunks: &mut ChunkStream,
) -> Result<Position> {
    let mut cursor = start;
    while let Some(chunk) = chunks.next().await {
        cursor = apply_chunk(editor, cursor, &chunk?);
    }
    Ok(cursor)
}

/// Replaces `selection` with [`PLACEHOLDER`].
pub fn show_placeholder(editor: &dyn Editor, selection: Selection) {
    editor.replace_range(PLACEHOLDER, selection.from, Some(selection.to));
}

/// Removes the placeholder shown at `at`.
///
/// Only the placeholder's own span is cleared, and only if the line still holds it at
/// that column. Returns whether anything was removed.
pub fn clear_placeholder(editor: &dyn Editor, at: Position) -> bool {
    let still_there = editor.line(at.line).is_some_and(|line| {
        line.chars()
            .skip(at.ch as usize)
            .take(PLACEHOLDER.chars().count())
            .eq(PLACEHOLDER.chars())
    });

    if !still_there {
        log::warn!(
            "placeholder no longer at {}:{}, leaving the line untouched",
            at.line,
            at.ch
        );
        return false;
    }

    editor.replace_range("", at, Some(advance(at, PLACEHOLDER)));
    true
}

fn char_len(text: &str) -> u32 {
    text.chars().count() as u32
}
