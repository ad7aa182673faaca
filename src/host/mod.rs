//! Capabilities the host editor hands to the plugin.
//!
//! Everything the plugin touches outside itself goes through these traits, so a
//! session can run against the real host or against in-memory doubles.

mod file_store;
mod memory;

pub use file_store::*;
pub use memory::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Position, Selection};

/// A focused text-editing surface.
pub trait Editor: Send + Sync {
    fn selection(&self) -> Selection;

    fn selected_text(&self) -> String;

    /// Contents of `line` without its line break, or `None` past the end of the buffer.
    fn line(&self, line: u32) -> Option<String>;

    /// Replaces `from..to` with `text`. With `to = None` this inserts at `from` and
    /// removes nothing.
    fn replace_range(&self, text: &str, from: Position, to: Option<Position>);
}

pub trait Workspace: Send + Sync {
    fn active_editor(&self) -> Option<Arc<dyn Editor>>;
}

/// User-visible notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Key-value persistence for the plugin's data blob.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load_data(&self) -> Result<Option<serde_json::Value>>;

    async fn save_data(&self, data: &serde_json::Value) -> Result<()>;
}

/// The collaborators injected into the plugin when the host loads it.
#[derive(Clone)]
pub struct PluginContext {
    pub workspace: Arc<dyn Workspace>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn SettingsStore>,
}

impl PluginContext {
    pub fn new(
        workspace: Arc<dyn Workspace>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            workspace,
            notifier,
            store,
        }
    }
}
