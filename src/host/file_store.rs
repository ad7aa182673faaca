use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::SettingsStore;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "ollama-inline";
const DATA_FILE_NAME: &str = "data.json";

/// Resolves (and creates) the per-user directory holding the plugin's data file.
pub fn get_app_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(Error::NoDataDir)?.join(APP_DIR_NAME);

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

/// Stores the plugin data blob as pretty-printed JSON on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located in the user's data directory.
    pub fn in_app_data_dir() -> Result<Self> {
        Ok(Self::new(get_app_data_dir()?.join(DATA_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn load_data(&self) -> Result<Option<serde_json::Value>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save_data(&self, data: &serde_json::Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&self.path, content).await?;
        log::debug!("saved plugin data to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));
        assert!(store.load_data().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("data.json"));
        let data = serde_json::json!({ "model": "m1", "systemPrompt": "p1" });

        store.save_data(&data).await.unwrap();

        assert_eq!(store.load_data().await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonFileStore::new(path).load_data().await;
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
