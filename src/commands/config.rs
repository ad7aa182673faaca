use crate::error::Result;
use crate::models::Settings;
use crate::plugin::OllamaPlugin;

/// One row of the settings tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingField {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
}

pub const SETTING_FIELDS: &[SettingField] = &[
    SettingField {
        key: "model",
        name: "Model",
        description: "Ollama model used for generation",
        placeholder: "llama3.2",
    },
    SettingField {
        key: "systemPrompt",
        name: "System prompt",
        description: "Text placed before the selection in every request",
        placeholder: "You are a helpful assistant.",
    },
];

pub fn get_settings(plugin: &OllamaPlugin) -> Settings {
    plugin.settings()
}

pub async fn set_model(plugin: &OllamaPlugin, model: String) -> Result<()> {
    plugin.update_settings(|settings| settings.model = model).await
}

pub async fn set_system_prompt(plugin: &OllamaPlugin, prompt: String) -> Result<()> {
    plugin
        .update_settings(|settings| settings.system_prompt = prompt)
        .await
}
