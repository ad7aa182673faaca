use crate::error::Result;
use crate::host::SettingsStore;
use crate::models::Settings;

/// Loads settings, merging whatever the store holds over the defaults.
pub async fn load_settings(store: &dyn SettingsStore) -> Result<Settings> {
    match store.load_data().await? {
        Some(data) => Ok(serde_json::from_value(data)?),
        None => Ok(Settings::default()),
    }
}

pub async fn save_settings(store: &dyn SettingsStore, settings: &Settings) -> Result<()> {
    store.save_data(&serde_json::to_value(settings)?).await
}
