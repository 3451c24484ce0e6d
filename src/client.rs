//! HTTP client for a llama-server-compatible inference endpoint.
//!
//! The chat loop talks to the model through the [`Generator`] trait: format
//! the whole history into one prompt, then open a fragment stream for it.
//! [`ModelServer`] implements the trait against the server's native API,
//! `GET /health` for the startup probe, `POST /apply-template` for chat
//! templating, and streaming `POST /completion` for generation.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};

use crate::chat::ChatConfig;
use crate::error::{Error, Result};
use crate::message::Message;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A lazily produced sequence of generated text fragments. Non-restartable;
/// ends at the model's stop or at the server-enforced fragment limit.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// The two model-side operations one chat turn needs.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Formats the full ordered history into a single prompt string, or
    /// fails with a descriptive error when the model has no usable chat
    /// template.
    async fn format_prompt(&self, history: &[Message]) -> Result<String>;

    /// Opens a fragment stream for a formatted prompt.
    async fn open_stream(&self, prompt: &str) -> Result<FragmentStream>;
}

/// Client for a local llama-server-compatible model server.
#[derive(Debug, Clone)]
pub struct ModelServer {
    client: ReqwestClient,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    seed: u64,
}

impl ModelServer {
    /// Create a client for the endpoint and sampling settings in `config`.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        // No overall request timeout: a long generation legitimately keeps
        // the completion response open for minutes.
        let client = ReqwestClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                Error::startup(
                    format!("failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            seed: config.seed,
        })
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Probes the server's health endpoint. Run before any terminal-mode
    /// change so a dead server is reported on the normal screen.
    pub async fn ensure_ready(&self) -> Result<()> {
        let url = format!("{}/health", self.endpoint);
        let response = self.client.get(&url).send().await.map_err(|e| {
            Error::startup(
                format!("model server unreachable at {}: {e}", self.endpoint),
                Some(Box::new(e)),
            )
        })?;

        if !response.status().is_success() {
            return Err(Error::startup(
                format!(
                    "model server at {} is not ready (status {})",
                    self.endpoint,
                    response.status()
                ),
                None,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Generator for ModelServer {
    async fn format_prompt(&self, history: &[Message]) -> Result<String> {
        let url = format!("{}/apply-template", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&TemplateRequest { messages: history })
            .send()
            .await
            .map_err(|e| Error::format(format!("template request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::format(format!(
                "server could not format the history (status {status}): {}",
                server_error_message(&body)
            )));
        }

        let parsed: TemplateResponse = response
            .json()
            .await
            .map_err(|e| Error::format(format!("malformed template response: {e}")))?;
        Ok(parsed.prompt)
    }

    async fn open_stream(&self, prompt: &str) -> Result<FragmentStream> {
        let url = format!("{}/completion", self.endpoint);
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            stream: true,
            n_predict: self.max_tokens,
            temperature: self.temperature,
            seed: self.seed,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                Error::stream(
                    format!("completion request failed: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::stream(
                format!(
                    "completion rejected (status {status}): {}",
                    server_error_message(&body)
                ),
                None,
            ));
        }

        Ok(Box::pin(fragments(response.bytes_stream())))
    }
}

#[derive(Serialize)]
struct TemplateRequest<'a> {
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct TemplateResponse {
    prompt: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    n_predict: u32,
    temperature: f64,
    seed: u64,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    content: String,
    #[serde(default)]
    stop: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Object { message: String },
    Text(String),
}

/// Pulls a usable message out of the server's JSON error body, falling back
/// to the raw text when the body is not the expected shape.
fn server_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ErrorField::Object { message },
        }) => message,
        Ok(ErrorBody {
            error: ErrorField::Text(text),
        }) => text,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error detail provided".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// Converts the server's byte stream into a stream of text fragments.
///
/// Events are framed by blank lines and may straddle chunk boundaries, so
/// bytes accumulate in a buffer until a full event is present. The event
/// flagged `stop` still yields its content; the stream ends after it.
fn fragments<S>(byte_stream: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    let stream = byte_stream.map(|result| {
        result.map_err(|e| Error::stream(format!("error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, false),
        move |(mut stream, mut buffer, mut finished)| async move {
            loop {
                if finished {
                    return None;
                }

                // First check if we have a complete event in the buffer.
                if let Some(end) = find_event_end(&buffer) {
                    let event: Vec<u8> = buffer.drain(..end).collect();
                    let text = String::from_utf8_lossy(&event);
                    let Some(payload) = data_payload(&text) else {
                        // Keep-alive or comment block.
                        continue;
                    };
                    match serde_json::from_str::<CompletionChunk>(payload) {
                        Ok(chunk) => {
                            if chunk.stop {
                                finished = true;
                            }
                            return Some((Ok(chunk.content), (stream, buffer, finished)));
                        }
                        Err(err) => {
                            return Some((
                                Err(Error::serialization(
                                    format!("malformed completion event: {err}"),
                                    Some(Box::new(err)),
                                )),
                                (stream, buffer, finished),
                            ));
                        }
                    }
                }

                // Read more data.
                match stream.next().await {
                    Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                    Some(Err(err)) => {
                        return Some((Err(err), (stream, buffer, finished)));
                    }
                    None => {
                        // End of stream; flush one unterminated final event.
                        if buffer.is_empty() {
                            return None;
                        }
                        let text = String::from_utf8_lossy(&buffer).into_owned();
                        buffer.clear();
                        let Some(payload) = data_payload(&text) else {
                            return None;
                        };
                        let result = serde_json::from_str::<CompletionChunk>(payload)
                            .map(|chunk| chunk.content)
                            .map_err(|err| {
                                Error::serialization(
                                    format!("malformed completion event: {err}"),
                                    Some(Box::new(err)),
                                )
                            });
                        return Some((result, (stream, buffer, finished)));
                    }
                }
            }
        },
    )
}

/// Byte length of the first blank-line-terminated event, if one is complete.
fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n").map(|i| i + 2)
}

/// The `data:` payload of an SSE event block, if it has one.
fn data_payload(event: &str) -> Option<&str> {
    event
        .lines()
        .find_map(|line| line.strip_prefix("data:").map(str::trim))
}
