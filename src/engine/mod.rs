/*!
 * Inference engine seam.
 *
 * This module defines the interface the translation workflow consumes:
 * an `Engine` session that streams completions and an `EngineLoader` that
 * creates sessions. The engine owns everything hard: model execution,
 * tokenization and the on-device weights cache. Implementations:
 * - `ollama`: a local Ollama server
 * - `mock`: scripted engine for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

use futures::stream::Stream;

use crate::errors::EngineError;

pub mod mock;
pub mod ollama;

/// One turn of an engine conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user or assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A finite, non-restartable sequence of incremental text deltas
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, EngineError>> + Send>>;

/// Progress report emitted while the engine loads a model
#[derive(Debug, Clone)]
pub struct LoadProgress {
    /// Completion fraction in [0, 1], non-decreasing across reports
    pub fraction: f32,
    /// Human-readable status line
    pub status: String,
}

/// Callback receiving load progress reports
pub type ProgressCallback = Arc<dyn Fn(LoadProgress) + Send + Sync>;

/// A progress callback that discards every report
pub fn noop_progress() -> ProgressCallback {
    Arc::new(|_report| {})
}

/// A live engine session
///
/// One session is created per application run and reused across requests.
/// Callers reset the conversation before each new translation request and
/// may raise an advisory interrupt at any time while a stream is in flight.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Clear prior turn history and the interrupt flag
    ///
    /// Must be called before starting a new translation request.
    async fn reset_conversation(&self) -> Result<(), EngineError>;

    /// Request a streaming completion for the given messages
    ///
    /// Deltas arrive in the engine's generation order; the stream ends when
    /// generation completes, fails, or an interrupt takes effect.
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<CompletionStream, EngineError>;

    /// Best-effort request to stop the in-flight stream
    ///
    /// Advisory: fragments already produced are not rolled back.
    fn interrupt(&self);

    /// Whether an interrupt was raised since the last conversation reset
    fn is_interrupted(&self) -> bool;

    /// Descriptive performance summary for the last generation, if any
    ///
    /// Advisory only; the text has no fixed schema.
    fn runtime_stats(&self) -> Option<String>;
}

/// Creates engine sessions
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Load the model and hand out a ready session
    ///
    /// `progress` receives monotonically non-decreasing completion fractions
    /// together with a status string while the load runs.
    async fn load(&self, progress: ProgressCallback) -> Result<Arc<dyn Engine>, EngineError>;

    /// Whether the model weights are already present in the on-device cache
    async fn is_model_cached(&self) -> Result<bool, EngineError>;
}
