use serde::{Deserialize, Serialize};

use super::Settings;

/// Body of an Ollama `/api/chat` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// The single-message streaming request sent for a selection.
    pub fn for_selection(settings: &Settings, selected_text: &str) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![ChatMessage::user(format!(
                "{}\n\n{}",
                settings.system_prompt, selected_text
            ))],
            stream: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "user" or "assistant"
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One NDJSON line of a streamed `/api/chat` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseChunk {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}
