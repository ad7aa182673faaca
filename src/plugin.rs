use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::commands::{self, CommandSpec, COMMANDS};
use crate::error::{Error, Result};
use crate::host::PluginContext;
use crate::models::Settings;
use crate::services::config_service;
use crate::services::llm_client::GenerationClient;
use crate::services::session_service::STOP_DELAY;

/// The loaded plugin: host collaborators, the generation client and current settings.
pub struct OllamaPlugin {
    ctx: PluginContext,
    client: Arc<dyn GenerationClient>,
    settings: Mutex<Settings>,
    stop_delay: Duration,
}

impl OllamaPlugin {
    /// Called when the host enables the plugin. Stored settings are merged over the
    /// defaults.
    pub async fn load(ctx: PluginContext, client: Arc<dyn GenerationClient>) -> Result<Self> {
        let settings = config_service::load_settings(ctx.store.as_ref()).await?;
        log::info!("loaded settings, model {}", settings.model);

        Ok(Self {
            ctx,
            client,
            settings: Mutex::new(settings),
            stop_delay: STOP_DELAY,
        })
    }

    pub fn with_stop_delay(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    pub fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    /// Dispatches a command by id. Sending awaits the whole session; stopping only
    /// schedules the abort.
    pub async fn run_command(&self, id: &str) -> Result<()> {
        match id {
            id if id == commands::SEND_COMMAND.id => commands::send_to_ollama(self).await,
            id if id == commands::STOP_COMMAND.id => {
                // Fire and forget: the abort lands after the stop delay.
                drop(commands::stop_ollama(self));
            }
            _ => return Err(Error::UnknownCommand(id.to_string())),
        }
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Applies `edit` and persists the result.
    pub async fn update_settings(&self, edit: impl FnOnce(&mut Settings)) -> Result<()> {
        let snapshot = {
            let mut settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            edit(&mut settings);
            settings.clone()
        };
        config_service::save_settings(self.ctx.store.as_ref(), &snapshot).await
    }

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    pub fn client(&self) -> &Arc<dyn GenerationClient> {
        &self.client
    }

    pub fn stop_delay(&self) -> Duration {
        self.stop_delay
    }
}
