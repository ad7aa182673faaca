use tokio::task::JoinHandle;

use crate::plugin::OllamaPlugin;
use crate::services::session_service;

/// Sends the current selection and streams the reply into the editor. Every outcome
/// is reported through the notifier, so nothing is returned.
pub async fn send_to_ollama(plugin: &OllamaPlugin) {
    let settings = plugin.settings();
    let outcome =
        session_service::send_selection(plugin.context(), plugin.client().as_ref(), &settings)
            .await;
    session_service::report_outcome(plugin.context().notifier.as_ref(), &outcome);
}

/// Schedules cancellation of the in-flight generation and returns immediately.
/// Awaiting the handle is optional.
pub fn stop_ollama(plugin: &OllamaPlugin) -> JoinHandle<()> {
    let client = plugin.client().clone();
    let delay = plugin.stop_delay();
    tokio::spawn(async move { session_service::stop(client.as_ref(), delay).await })
}
