/*!
 * Translation service: engine lifecycle around the orchestrator.
 *
 * The service owns the one engine session of the application run. It is
 * created lazily on the first request, reused afterwards, and left unset
 * when loading fails so that the next request retries from scratch.
 */

use futures::stream;
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::app_config::Direction;
use crate::engine::{Engine, EngineLoader, ProgressCallback};
use crate::errors::{EngineError, TranslateError};

use super::orchestrator::{self, TranslationRequest, TranslationStream};
use super::prompts::PromptSet;

/// Streaming translation front-end over a lazily loaded engine
pub struct TranslationService {
    /// Creates the engine session on first use
    loader: Arc<dyn EngineLoader>,
    /// The shared session, present once a load has succeeded
    engine: Mutex<Option<Arc<dyn Engine>>>,
    /// Instruction templates used for every request
    prompts: PromptSet,
}

impl TranslationService {
    /// Create a service with the default prompt set
    pub fn new(loader: Arc<dyn EngineLoader>) -> Self {
        Self::with_prompts(loader, PromptSet::default())
    }

    /// Create a service with a caller-supplied prompt set
    pub fn with_prompts(loader: Arc<dyn EngineLoader>, prompts: PromptSet) -> Self {
        Self {
            loader,
            engine: Mutex::new(None),
            prompts,
        }
    }

    /// Whether an engine session is currently live
    pub fn is_loaded(&self) -> bool {
        self.engine.lock().is_some()
    }

    /// Whether the model weights are already in the on-device cache
    pub async fn is_model_cached(&self) -> Result<bool, EngineError> {
        self.loader.is_model_cached().await
    }

    /// Forward an advisory interrupt to the live engine, if any
    pub fn interrupt(&self) {
        if let Some(engine) = self.engine.lock().as_ref() {
            warn!("Interrupt requested, asking the engine to stop generating");
            engine.interrupt();
        }
    }

    /// Performance summary of the most recent generation, if any
    pub fn runtime_stats(&self) -> Option<String> {
        self.engine
            .lock()
            .as_ref()
            .and_then(|engine| engine.runtime_stats())
    }

    /// Translate a text, streaming events as they are produced
    ///
    /// Empty input completes immediately with no events and no engine
    /// interaction. A failed engine load produces a stream with exactly one
    /// `Err` item and leaves the session unset.
    pub async fn translate_streaming(
        &self,
        text: &str,
        direction: Direction,
        progress: ProgressCallback,
    ) -> TranslationStream {
        if text.is_empty() {
            return Box::pin(stream::empty());
        }

        let engine = match self.engine_session(progress).await {
            Ok(engine) => engine,
            Err(error) => {
                return Box::pin(stream::iter(vec![Err(TranslateError::Load(error))]));
            }
        };

        orchestrator::translate(
            engine,
            self.prompts.clone(),
            TranslationRequest::new(text, direction),
        )
    }

    /// Fetch the live session, loading the engine on first use
    async fn engine_session(
        &self,
        progress: ProgressCallback,
    ) -> Result<Arc<dyn Engine>, EngineError> {
        if let Some(engine) = self.engine.lock().as_ref() {
            return Ok(Arc::clone(engine));
        }

        info!("No engine session yet, loading the model");
        let engine = self.loader.load(progress).await?;
        *self.engine.lock() = Some(Arc::clone(&engine));
        Ok(engine)
    }
}
