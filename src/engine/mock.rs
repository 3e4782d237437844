/*!
 * Mock engine implementations for testing.
 *
 * This module provides scripted engines that simulate different behaviors:
 * - `MockEngine::working()` - Always streams a translated fragment
 * - `MockEngine::failing()` - Fails when a stream is requested
 * - `MockEngine::failing_after(n)` - Streams n fragments, then errors
 * - `MockEngine::interrupting_after(n)` - Raises its own interrupt after n fragments
 *
 * Engines record every submitted payload and every conversation reset, in
 * order, so tests can assert call sequences. Clones share that state.
 */

// Allow dead code - scripted engines are consumed by the test suite
#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::errors::EngineError;

use super::{ChatMessage, CompletionStream, Engine, EngineLoader, LoadProgress, ProgressCallback};

/// Behavior mode for the mock engine
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always streams successfully
    Working,
    /// Fails when the stream is requested
    FailingOnStart,
    /// Streams the given number of fragments, then yields an error
    FailingMidStream { after: usize },
    /// Raises its own interrupt after the given number of fragments
    InterruptAfter { fragments: usize },
    /// Streams successfully with a delay before each fragment
    Slow { delay_ms: u64 },
}

/// Observable engine interactions, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    /// `reset_conversation` was called
    Reset,
    /// `stream_completion` was called with this payload
    Completion(String),
}

/// Scripted engine for testing translation behavior
#[derive(Debug)]
pub struct MockEngine {
    /// Behavior mode
    behavior: MockBehavior,
    /// Optional per-call fragment scripts; call N uses script N
    scripts: Option<Vec<Vec<String>>>,
    /// Interaction log shared across clones
    events: Arc<Mutex<Vec<MockEvent>>>,
    /// Number of stream_completion calls so far
    call_count: Arc<AtomicUsize>,
    /// Advisory interrupt flag
    interrupted: Arc<AtomicBool>,
}

impl MockEngine {
    /// Create a new mock engine with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            scripts: None,
            events: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a working mock engine that echoes each payload as one fragment
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock engine that errors when a stream is requested
    pub fn failing() -> Self {
        Self::new(MockBehavior::FailingOnStart)
    }

    /// Create a mock engine that errors after streaming some fragments
    pub fn failing_after(after: usize) -> Self {
        Self::new(MockBehavior::FailingMidStream { after })
    }

    /// Create a mock engine that interrupts itself after some fragments
    pub fn interrupting_after(fragments: usize) -> Self {
        Self::new(MockBehavior::InterruptAfter { fragments })
    }

    /// Create a slow mock engine for timing-sensitive tests
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Script the fragments streamed by each successive call
    pub fn with_scripts(mut self, scripts: Vec<Vec<&str>>) -> Self {
        self.scripts = Some(
            scripts
                .into_iter()
                .map(|call| call.into_iter().map(str::to_string).collect())
                .collect(),
        );
        self
    }

    /// Payloads submitted so far, in call order
    pub fn submitted_payloads(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                MockEvent::Completion(payload) => Some(payload.clone()),
                MockEvent::Reset => None,
            })
            .collect()
    }

    /// Full interaction log, in call order
    pub fn events(&self) -> Vec<MockEvent> {
        self.events.lock().clone()
    }

    /// Number of stream_completion calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of conversation resets so far
    pub fn reset_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, MockEvent::Reset))
            .count()
    }

    /// Fragments for one call, from the script or the default echo
    fn fragments_for(&self, call_index: usize, payload: &str) -> Vec<String> {
        if let Some(scripts) = &self.scripts {
            return scripts.get(call_index).cloned().unwrap_or_default();
        }
        vec![format!("[translated] {}", payload)]
    }
}

impl Clone for MockEngine {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            scripts: self.scripts.clone(),
            events: Arc::clone(&self.events),
            call_count: Arc::clone(&self.call_count),
            interrupted: Arc::clone(&self.interrupted),
        }
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn reset_conversation(&self) -> Result<(), EngineError> {
        self.interrupted.store(false, Ordering::SeqCst);
        self.events.lock().push(MockEvent::Reset);
        Ok(())
    }

    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<CompletionStream, EngineError> {
        let payload = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let call_index = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.events.lock().push(MockEvent::Completion(payload.clone()));

        if self.behavior == MockBehavior::FailingOnStart {
            return Err(EngineError::RequestFailed(
                "simulated engine failure".to_string(),
            ));
        }

        let mut items: Vec<Result<String, EngineError>> = self
            .fragments_for(call_index, &payload)
            .into_iter()
            .map(Ok)
            .collect();

        let mut auto_interrupt_after = None;
        let mut delay_ms = 0;
        match self.behavior {
            MockBehavior::FailingMidStream { after } => {
                items.truncate(after);
                items.push(Err(EngineError::RequestFailed(
                    "simulated mid-stream failure".to_string(),
                )));
            }
            MockBehavior::InterruptAfter { fragments } => {
                auto_interrupt_after = Some(fragments);
            }
            MockBehavior::Slow { delay_ms: ms } => {
                delay_ms = ms;
            }
            _ => {}
        }

        let interrupted = Arc::clone(&self.interrupted);
        let gate = Arc::clone(&self.interrupted);
        let yielded = Arc::new(AtomicUsize::new(0));

        let stream = stream::iter(items)
            .take_while(move |_| {
                let keep = !gate.load(Ordering::SeqCst);
                async move { keep }
            })
            .then(move |item| {
                let interrupted = Arc::clone(&interrupted);
                let yielded = Arc::clone(&yielded);
                async move {
                    if delay_ms > 0 {
                        tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                    }
                    let count = yielded.fetch_add(1, Ordering::SeqCst) + 1;
                    if auto_interrupt_after == Some(count) {
                        interrupted.store(true, Ordering::SeqCst);
                    }
                    item
                }
            });

        Ok(Box::pin(stream))
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn runtime_stats(&self) -> Option<String> {
        if self.call_count() == 0 {
            None
        } else {
            Some(format!(
                "{} scripted generations (mock engine)",
                self.call_count()
            ))
        }
    }
}

/// Loader that hands out a prepared mock engine, or fails on demand
pub struct MockLoader {
    /// Engine returned by successful loads
    engine: Option<Arc<MockEngine>>,
    /// When set, loads fail with this reason
    fail_reason: Option<String>,
    /// Scripted progress reports, emitted in order before the load resolves
    progress_script: Vec<(f32, String)>,
    /// Whether the model counts as already cached
    cached: bool,
    /// Number of load attempts so far
    load_count: Arc<AtomicUsize>,
}

impl MockLoader {
    /// A loader that succeeds with the given engine
    pub fn working(engine: Arc<MockEngine>) -> Self {
        Self {
            engine: Some(engine),
            fail_reason: None,
            progress_script: vec![
                (0.25, "Fetching weights".to_string()),
                (0.75, "Fetching weights".to_string()),
                (1.0, "Model ready".to_string()),
            ],
            cached: true,
            load_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A loader whose every load attempt fails
    pub fn failing(reason: &str) -> Self {
        Self {
            engine: None,
            fail_reason: Some(reason.to_string()),
            progress_script: Vec::new(),
            cached: false,
            load_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Override the scripted progress sequence
    pub fn with_progress_script(mut self, script: Vec<(f32, &str)>) -> Self {
        self.progress_script = script
            .into_iter()
            .map(|(fraction, status)| (fraction, status.to_string()))
            .collect();
        self
    }

    /// Number of load attempts so far
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLoader for MockLoader {
    async fn load(&self, progress: ProgressCallback) -> Result<Arc<dyn Engine>, EngineError> {
        self.load_count.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.fail_reason {
            return Err(EngineError::LoadFailed(reason.clone()));
        }

        for (fraction, status) in &self.progress_script {
            progress(LoadProgress {
                fraction: *fraction,
                status: status.clone(),
            });
        }

        let engine = self
            .engine
            .as_ref()
            .expect("working loader must hold an engine");
        Ok(Arc::clone(engine) as Arc<dyn Engine>)
    }

    async fn is_model_cached(&self) -> Result<bool, EngineError> {
        Ok(self.cached)
    }
}
