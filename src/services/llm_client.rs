use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{Error, Result};
use crate::models::{ChatRequest, ChatResponseChunk};

pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";
const DEFAULT_PORT: u16 = 11434;
const HOST_ENV_VAR: &str = "OLLAMA_HOST";

// ============================================================================
// CLIENT CONTRACT
// ============================================================================

/// A streaming chat backend.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Issues `request` and returns its completion as a pull-based chunk sequence.
    async fn chat(&self, request: ChatRequest) -> Result<ChunkStream>;

    /// Cancels every request and stream this client has handed out so far.
    /// Safe to call when nothing is in flight.
    fn abort(&self);
}

/// The text fragments of one generation, pulled one at a time.
///
/// Every pull races the stream against its cancellation token. Once the token fires,
/// the next pull yields [`Error::Aborted`] and the stream is finished.
pub struct ChunkStream {
    chunks: BoxStream<'static, Result<String>>,
    cancel: CancellationToken,
    finished: bool,
}

impl ChunkStream {
    pub fn new(chunks: BoxStream<'static, Result<String>>, cancel: CancellationToken) -> Self {
        Self {
            chunks,
            cancel,
            finished: false,
        }
    }

    /// `Some(Ok(chunk))` for the next fragment, `None` once the generation is done, or
    /// `Some(Err(_))` (at most once) when it failed or was aborted.
    pub async fn next(&mut self) -> Option<Result<String>> {
        if self.finished {
            return None;
        }

        let next = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Some(Err(Error::Aborted)),
            next = self.chunks.next() => next,
        };

        if !matches!(next, Some(Ok(_))) {
            self.finished = true;
        }
        next
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Ollama server address. `None` means `OLLAMA_HOST`, then [`DEFAULT_HOST`].
    pub host: Option<String>,
}

impl ClientConfig {
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
        }
    }

    pub fn from_env() -> Self {
        Self {
            host: std::env::var(HOST_ENV_VAR)
                .ok()
                .filter(|host| !host.trim().is_empty()),
        }
    }

    pub fn resolve_host(&self) -> Result<String> {
        match &self.host {
            Some(host) => format_host(host),
            None => Ok(DEFAULT_HOST.to_string()),
        }
    }
}

/// Normalizes a user-supplied host: adds `http://` when no scheme is given, the
/// default Ollama port when a plain-http host has none, and drops trailing slashes.
pub fn format_host(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_HOST.to_string());
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|source| Error::InvalidHost {
        host: raw.to_string(),
        source,
    })?;

    if url.scheme() == "http" && !has_explicit_port(&with_scheme) {
        // `set_port` only fails for URLs that cannot carry a host, which http URLs always can.
        let _ = url.set_port(Some(DEFAULT_PORT));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// `Url` hides ports equal to the scheme default, so check the authority text itself.
fn has_explicit_port(with_scheme: &str) -> bool {
    let rest = with_scheme
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(with_scheme);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let after_ipv6 = host_port.rsplit(']').next().unwrap_or_default();

    after_ipv6
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

// ============================================================================
// OLLAMA CLIENT
// ============================================================================

/// Client for Ollama's streaming `/api/chat` endpoint.
pub struct OllamaClient {
    client: Client,
    host: String,
    abort: Mutex<CancellationToken>,
}

impl OllamaClient {
    /// Create a new client. Requests carry no timeout: a generation waits for its next
    /// chunk until it finishes or is aborted.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            host: config.resolve_host()?,
            abort: Mutex::new(CancellationToken::new()),
        })
    }

    /// Create a new client honoring `OLLAMA_HOST`.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn current_token(&self) -> CancellationToken {
        self.abort
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChunkStream> {
        let cancel = self.current_token();
        let url = format!("{}/api/chat", self.host);
        log::debug!("Ollama: POST {} (model {})", url, request.model);

        let send = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Aborted),
            response = send => response?,
        };

        let status = response.status();
        log::debug!("Ollama: response status {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ChunkStream::new(
            decode_chunks(response.bytes_stream()),
            cancel,
        ))
    }

    fn abort(&self) {
        let mut token = self.abort.lock().unwrap_or_else(|e| e.into_inner());
        token.cancel();
        *token = CancellationToken::new();
    }
}

// ============================================================================
// NDJSON DECODING
// ============================================================================

struct DecodeState<T> {
    body: BoxStream<'static, T>,
    buffer: Vec<u8>,
    finished: bool,
}

struct DecodedLine {
    content: Option<String>,
    done: bool,
}

/// Turns a raw `/api/chat` body into its message fragments. Blank lines and empty
/// contents are skipped; the sequence ends at the first `"done": true` line, the end
/// of the body, or the first error.
pub fn decode_chunks<S, B, E>(body: S) -> BoxStream<'static, Result<String>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    let state = DecodeState {
        body: body.boxed(),
        buffer: Vec::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            if let Some(newline) = state.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buffer.drain(..=newline).collect();
                match decode_line(&line) {
                    Ok(decoded) => {
                        state.finished = decoded.done;
                        if let Some(content) = decoded.content {
                            return Some((Ok(content), state));
                        }
                        continue;
                    }
                    Err(e) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                }
            }

            match state.body.next().await {
                Some(Ok(bytes)) => state.buffer.extend_from_slice(bytes.as_ref()),
                Some(Err(e)) => {
                    let error: Error = e.into();
                    state.finished = true;
                    return Some((Err(error), state));
                }
                None => {
                    // The last line may arrive without a trailing newline.
                    state.finished = true;
                    let rest = std::mem::take(&mut state.buffer);
                    return match decode_line(&rest) {
                        Ok(DecodedLine {
                            content: Some(content),
                            ..
                        }) => Some((Ok(content), state)),
                        Ok(_) => None,
                        Err(e) => Some((Err(e), state)),
                    };
                }
            }
        }
    })
    .boxed()
}

fn decode_line(line: &[u8]) -> Result<DecodedLine> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(DecodedLine {
            content: None,
            done: false,
        });
    }

    let chunk: ChatResponseChunk = serde_json::from_slice(line)?;
    if let Some(error) = chunk.error {
        return Err(Error::Server(error));
    }

    Ok(DecodedLine {
        content: chunk
            .message
            .map(|message| message.content)
            .filter(|content| !content.is_empty()),
        done: chunk.done,
    })
}
