use std::time::Duration;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::host::{Notifier, PluginContext};
use crate::models::{ChatRequest, Position, Settings};
use crate::services::llm_client::GenerationClient;
use crate::services::stream_inserter::{clear_placeholder, show_placeholder, stream_into};

pub const ABORTED_NOTICE: &str = "Aborted all requests";
pub const FAILURE_NOTICE: &str = "❌ Error communicating with Ollama.";

/// Pause before a stop request reaches the client, so a request issued just before
/// the stop has started and can be cancelled.
pub const STOP_DELAY: Duration = Duration::from_secs(1);

/// Runs one generation session against the active editor: replaces the selection
/// with the placeholder, sends it, then streams the reply in where the selection began.
///
/// Returns the cursor after the last inserted chunk.
pub async fn send_selection(
    ctx: &PluginContext,
    client: &dyn GenerationClient,
    settings: &Settings,
) -> Result<Position> {
    let editor = ctx
        .workspace
        .active_editor()
        .ok_or(Error::NoActiveEditor)?;

    let selection = editor.selection();
    let selected_text = editor.selected_text();
    if selection.is_empty() || selected_text.is_empty() {
        return Err(Error::EmptySelection);
    }

    let session_id = Uuid::new_v4();
    log::info!(
        "session {}: sending {} chars to model {}",
        session_id,
        selected_text.chars().count(),
        settings.model
    );

    let request = ChatRequest::for_selection(settings, &selected_text);
    show_placeholder(editor.as_ref(), selection);

    let chat = client.chat(request).await;
    clear_placeholder(editor.as_ref(), selection.from);
    let mut chunks = chat?;

    let cursor = stream_into(editor.as_ref(), selection.from, &mut chunks).await?;
    log::info!(
        "session {}: finished at {}:{}",
        session_id,
        cursor.line,
        cursor.ch
    );
    Ok(cursor)
}

/// Turns a session outcome into at most one user notice.
pub fn report_outcome(notifier: &dyn Notifier, outcome: &Result<Position>) {
    match outcome {
        Ok(_) => {}
        Err(error) if error.is_precondition() => notifier.notify(&error.to_string()),
        Err(Error::Aborted) => {
            log::info!("generation aborted");
            notifier.notify(ABORTED_NOTICE);
        }
        Err(error) => {
            log::error!("Error communicating with Ollama: {}", error);
            notifier.notify(FAILURE_NOTICE);
        }
    }
}

/// Cancels whatever generation `client` has in flight after `delay`.
pub async fn stop(client: &dyn GenerationClient, delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    log::info!("aborting in-flight Ollama requests");
    client.abort();
}
