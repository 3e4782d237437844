/*!
 * Local Ollama engine implementation.
 *
 * Maps the engine seam onto a local Ollama server: the server's model store
 * is the on-device weights cache, `/api/pull` is the load path (streamed
 * status lines become monotonic progress reports) and `/api/chat` with
 * `stream: true` produces the incremental deltas.
 */

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures_util::StreamExt;
use log::{debug, error, warn};
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::app_config::EngineConfig;
use crate::errors::EngineError;

use super::{ChatMessage, CompletionStream, Engine, EngineLoader, LoadProgress, ProgressCallback};

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Whether to stream the response
    stream: bool,
    /// How long to keep the model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// One NDJSON line of a streaming chat response
#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    /// Incremental assistant message
    message: Option<ChatMessage>,
    /// Whether the generation is complete
    #[serde(default)]
    done: bool,
    /// Number of prompt tokens
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(default)]
    eval_count: Option<u64>,
    /// Duration of generation in nanoseconds
    #[serde(default)]
    eval_duration: Option<u64>,
    /// Total duration of the request in nanoseconds
    #[serde(default)]
    total_duration: Option<u64>,
}

/// One NDJSON line of a streaming pull response
#[derive(Debug, Deserialize)]
struct PullStreamChunk {
    /// Human-readable pull phase
    #[serde(default)]
    status: String,
    /// Total bytes of the current layer
    #[serde(default)]
    total: Option<u64>,
    /// Bytes downloaded so far for the current layer
    #[serde(default)]
    completed: Option<u64>,
    /// Server-side error text
    #[serde(default)]
    error: Option<String>,
}

/// Response from the model store listing
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

/// One locally available model
#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Counters reported by the terminal chunk of a generation
#[derive(Debug, Clone, Default)]
struct GenerationStats {
    prompt_eval_count: u64,
    eval_count: u64,
    eval_duration_ns: u64,
    total_duration_ns: u64,
}

impl GenerationStats {
    /// Render the counters as a short performance summary
    fn summary(&self) -> String {
        let total_secs = self.total_duration_ns as f64 / 1e9;
        let rate = if self.eval_duration_ns > 0 {
            self.eval_count as f64 / (self.eval_duration_ns as f64 / 1e9)
        } else {
            0.0
        };
        format!(
            "{} prompt tokens, {} generated tokens in {:.1}s ({:.1} tokens/s)",
            self.prompt_eval_count, self.eval_count, total_secs, rate
        )
    }
}

/// Normalize an endpoint into a base URL with scheme and no trailing slash
fn normalize_base_url(endpoint: &str) -> String {
    let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };
    with_scheme.trim_end_matches('/').to_string()
}

/// Whether a locally stored model name satisfies the requested model
///
/// An untagged request matches any tag of the same model.
fn model_matches(stored: &str, requested: &str) -> bool {
    if stored == requested {
        return true;
    }
    if !requested.contains(':') {
        if let Some((base, _tag)) = stored.split_once(':') {
            return base == requested;
        }
    }
    false
}

/// Engine session backed by a local Ollama server
pub struct OllamaEngine {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the server
    base_url: String,
    /// Model name in the local store
    model: String,
    /// Keep-alive duration forwarded to the server
    keep_alive: Option<String>,
    /// Conversation turn history, cleared on reset
    history: Arc<Mutex<Vec<ChatMessage>>>,
    /// Advisory interrupt flag, cleared on reset
    interrupted: Arc<AtomicBool>,
    /// Counters from the most recent completed generation
    stats: Arc<Mutex<Option<GenerationStats>>>,
}

impl OllamaEngine {
    fn new(client: Client, base_url: String, model: String, keep_alive: Option<String>) -> Self {
        Self {
            client,
            base_url,
            model,
            keep_alive,
            history: Arc::new(Mutex::new(Vec::new())),
            interrupted: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl Engine for OllamaEngine {
    async fn reset_conversation(&self) -> Result<(), EngineError> {
        self.history.lock().clear();
        self.interrupted.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<CompletionStream, EngineError> {
        let request_messages = {
            let mut history = self.history.lock();
            history.extend(messages);
            history.clone()
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: request_messages,
            stream: true,
            keep_alive: self.keep_alive.clone(),
        };

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::RequestFailed(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            error!("Engine chat error ({}): {}", status, message);
            return Err(EngineError::Api {
                status_code: status.as_u16(),
                message,
            });
        }

        let (tx, rx) = mpsc::channel::<Result<String, EngineError>>(32);
        let interrupted = Arc::clone(&self.interrupted);
        let history = Arc::clone(&self.history);
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            let mut assistant_reply = String::new();

            'receive: while let Some(chunk) = body.next().await {
                let bytes: Bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(Err(EngineError::RequestFailed(format!(
                                "stream transport error: {}",
                                e
                            ))))
                            .await;
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);

                while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                    let Ok(raw) = std::str::from_utf8(&line_bytes) else {
                        continue;
                    };
                    let line = raw.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let parsed = match serde_json::from_str::<ChatStreamChunk>(line) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            // The server reports failures as an {"error": ...} line
                            if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
                                if let Some(server_error) =
                                    value.get("error").and_then(|v| v.as_str())
                                {
                                    let _ = tx
                                        .send(Err(EngineError::RequestFailed(
                                            server_error.to_string(),
                                        )))
                                        .await;
                                    return;
                                }
                            }
                            let _ = tx
                                .send(Err(EngineError::Parse(format!(
                                    "bad stream line: {}",
                                    e
                                ))))
                                .await;
                            return;
                        }
                    };

                    if let Some(message) = parsed.message {
                        if !message.content.is_empty() {
                            if interrupted.load(Ordering::SeqCst) {
                                debug!("Generation interrupted, dropping remaining deltas");
                                break 'receive;
                            }
                            assistant_reply.push_str(&message.content);
                            if tx.send(Ok(message.content)).await.is_err() {
                                // Consumer went away, stop pulling from the server
                                return;
                            }
                        }
                    }

                    if parsed.done {
                        *stats.lock() = Some(GenerationStats {
                            prompt_eval_count: parsed.prompt_eval_count.unwrap_or(0),
                            eval_count: parsed.eval_count.unwrap_or(0),
                            eval_duration_ns: parsed.eval_duration.unwrap_or(0),
                            total_duration_ns: parsed.total_duration.unwrap_or(0),
                        });
                        break 'receive;
                    }
                }

                if interrupted.load(Ordering::SeqCst) {
                    break 'receive;
                }
            }

            // Whatever was generated, partial or complete, becomes the
            // assistant turn of the conversation.
            if !assistant_reply.is_empty() {
                history.lock().push(ChatMessage::assistant(assistant_reply));
            }
        });

        Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })))
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn runtime_stats(&self) -> Option<String> {
        self.stats.lock().as_ref().map(GenerationStats::summary)
    }
}

/// Loader that produces `OllamaEngine` sessions
pub struct OllamaLoader {
    /// HTTP client shared with the sessions it creates
    client: Client,
    /// Base URL of the server
    base_url: String,
    /// Model name to load
    model: String,
    /// Keep-alive duration forwarded to sessions
    keep_alive: Option<String>,
}

impl OllamaLoader {
    /// Create a loader from the engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: normalize_base_url(&config.endpoint),
            model: config.model.clone(),
            keep_alive: config.keep_alive.clone(),
        }
    }

    /// Check that the server answers at all
    async fn check_server(&self) -> Result<(), EngineError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            EngineError::Connection(format!(
                "engine server unreachable at {}: {}",
                self.base_url, e
            ))
        })?;

        if !response.status().is_success() {
            return Err(EngineError::Connection(format!(
                "engine server at {} answered with status {}",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }

    /// Pull the model weights, forwarding progress reports
    async fn pull_model(&self, progress: &ProgressCallback) -> Result<(), EngineError> {
        let url = format!("{}/api/pull", self.base_url);
        let body = serde_json::json!({ "name": self.model, "stream": true });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::LoadFailed(format!("pull request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(EngineError::LoadFailed(format!(
                "pull rejected ({}): {}",
                status, message
            )));
        }

        let mut body = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        // The server restarts its byte counters between layers; the reported
        // fraction must never go backwards.
        let mut last_fraction: f32 = 0.0;

        while let Some(chunk) = body.next().await {
            let bytes = chunk
                .map_err(|e| EngineError::LoadFailed(format!("pull stream error: {}", e)))?;
            buffer.extend_from_slice(&bytes);

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let Ok(raw) = std::str::from_utf8(&line_bytes) else {
                    continue;
                };
                let line = raw.trim();
                if line.is_empty() {
                    continue;
                }

                let parsed: PullStreamChunk = serde_json::from_str(line)
                    .map_err(|e| EngineError::Parse(format!("bad pull line: {}", e)))?;

                if let Some(server_error) = parsed.error {
                    return Err(EngineError::LoadFailed(server_error));
                }

                if let (Some(completed), Some(total)) = (parsed.completed, parsed.total) {
                    if total > 0 {
                        let fraction = (completed as f32 / total as f32).clamp(0.0, 1.0);
                        last_fraction = last_fraction.max(fraction);
                    }
                }

                progress(LoadProgress {
                    fraction: last_fraction,
                    status: parsed.status,
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl EngineLoader for OllamaLoader {
    async fn load(&self, progress: ProgressCallback) -> Result<Arc<dyn Engine>, EngineError> {
        self.check_server().await?;

        if self.is_model_cached().await.unwrap_or(false) {
            // Cache hit, the server loads weights from its local store
            progress(LoadProgress {
                fraction: 1.0,
                status: format!("Loading {} from the local model store", self.model),
            });
        } else {
            warn!(
                "Model {} not in the local store, downloading weights (this can take a while)",
                self.model
            );
            self.pull_model(&progress).await?;
            progress(LoadProgress {
                fraction: 1.0,
                status: format!("Model {} ready", self.model),
            });
        }

        Ok(Arc::new(OllamaEngine::new(
            self.client.clone(),
            self.base_url.clone(),
            self.model.clone(),
            self.keep_alive.clone(),
        )))
    }

    async fn is_model_cached(&self) -> Result<bool, EngineError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::Connection(format!("tags request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Api {
                status_code: status.as_u16(),
                message: "model store listing failed".to_string(),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(format!("bad tags response: {}", e)))?;

        Ok(tags
            .models
            .iter()
            .any(|m| model_matches(&m.name, &self.model)))
    }
}
