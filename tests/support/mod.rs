#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ollama_inline::host::{
    MemoryEditor, MemoryStore, Notifier, PluginContext, SingleEditorWorkspace, SettingsStore,
};
use ollama_inline::models::ChatRequest;
use ollama_inline::services::llm_client::{ChunkStream, GenerationClient};
use ollama_inline::{Error, Result};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Keeps log records per thread, so parallel tests don't see each other's output.
struct CapturingLogger;

impl log::Log for CapturingLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static CAPTURING_LOGGER: CapturingLogger = CapturingLogger;

/// Routes log records into a per-thread buffer and clears it. Must run before
/// [`init_logging`] in a test binary, otherwise env_logger owns the global logger.
pub fn capture_logs() {
    if log::set_logger(&CAPTURING_LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Messages logged on this thread at exactly `level` since [`capture_logs`].
pub fn captured(level: log::Level) -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    })
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// What the fake does when `chat` is called.
pub enum Script {
    /// Yields these items, then ends.
    Chunks(Vec<Result<String>>),
    /// Yields these chunks, then waits until aborted.
    ChunksThenHang(Vec<String>),
    /// `chat` never answers and returns only once the client is aborted.
    HangUntilAborted,
    /// `chat` itself fails.
    Fail(Error),
}

/// Scripted generation client with the same abort semantics as the real one.
pub struct FakeClient {
    script: Mutex<Option<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
    abort: Mutex<CancellationToken>,
    aborts: AtomicUsize,
    // Keeps hanging streams open.
    senders: Mutex<Vec<mpsc::UnboundedSender<Result<String>>>>,
}

impl FakeClient {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Some(script)),
            requests: Mutex::new(Vec::new()),
            abort: Mutex::new(CancellationToken::new()),
            aborts: AtomicUsize::new(0),
            senders: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = Some(script);
    }
}

#[async_trait]
impl GenerationClient for FakeClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChunkStream> {
        self.requests.lock().unwrap().push(request);
        let cancel = self.abort.lock().unwrap().clone();
        let script = self
            .script
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Script::Chunks(Vec::new()));

        match script {
            Script::Chunks(items) => Ok(ChunkStream::new(stream::iter(items).boxed(), cancel)),
            Script::ChunksThenHang(chunks) => {
                let (tx, rx) = mpsc::unbounded_channel();
                for chunk in chunks {
                    tx.send(Ok(chunk)).unwrap();
                }
                self.senders.lock().unwrap().push(tx);
                Ok(ChunkStream::new(UnboundedReceiverStream::new(rx).boxed(), cancel))
            }
            Script::HangUntilAborted => {
                cancel.cancelled().await;
                Err(Error::Aborted)
            }
            Script::Fail(error) => Err(error),
        }
    }

    fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        let mut token = self.abort.lock().unwrap();
        token.cancel();
        *token = CancellationToken::new();
    }
}

pub struct Harness {
    pub editor: Arc<MemoryEditor>,
    pub workspace: Arc<SingleEditorWorkspace>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryStore>,
    pub ctx: PluginContext,
}

impl Harness {
    pub fn new(text: &str) -> Self {
        init_logging();
        let editor = Arc::new(MemoryEditor::new(text));
        let workspace = Arc::new(SingleEditorWorkspace::new(editor.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let store = Arc::new(MemoryStore::default());
        let ctx = PluginContext::new(
            workspace.clone(),
            notifier.clone(),
            store.clone() as Arc<dyn SettingsStore>,
        );
        Self {
            editor,
            workspace,
            notifier,
            store,
            ctx,
        }
    }
}
