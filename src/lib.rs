//! Sends the selected text of an editor to a local Ollama server and streams the
//! completion back into the document where the selection was.
//!
//! The host supplies a [`host::PluginContext`] (workspace, notifier, settings store)
//! and a [`services::llm_client::GenerationClient`], usually an
//! [`services::llm_client::OllamaClient`]. [`OllamaPlugin`] exposes the two commands
//! and the settings edits.

pub mod commands;
pub mod error;
pub mod host;
pub mod models;
mod plugin;
pub mod services;

pub use error::{Error, Result};
pub use plugin::OllamaPlugin;
