use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "llama3.2";

/// Persisted plugin settings.
///
/// Missing fields fall back to [`Settings::default`], so stored data is merged over the
/// defaults on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub model: String,
    pub system_prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: String::new(),
        }
    }
}
