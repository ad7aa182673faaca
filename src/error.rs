use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No active editor found.")]
    NoActiveEditor,
    #[error("Please select some text to send to Ollama.")]
    EmptySelection,
    /// The client's `abort()` fired while the request or stream was in flight.
    #[error("request aborted")]
    Aborted,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Ollama API error ({status}): {body}")]
    Api { status: u16, body: String },
    /// An `{"error": ...}` line inside an otherwise successful stream.
    #[error("Ollama error: {0}")]
    Server(String),
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid Ollama host {host:?}: {source}")]
    InvalidHost {
        host: String,
        source: url::ParseError,
    },
    #[error("settings storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not find data directory")]
    NoDataDir,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl Error {
    /// Precondition failures are reported before any request is issued.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::NoActiveEditor | Error::EmptySelection)
    }
}
