/*!
 * Common test utilities for the tradwai test suite
 */

use std::sync::Arc;

use futures::StreamExt;
use tradwai::engine::mock::{MockEngine, MockLoader};
use tradwai::errors::TranslateError;
use tradwai::translation::{TranslationEvent, TranslationService, TranslationStream};

/// Build a service backed by the given mock engine
pub fn service_with(engine: Arc<MockEngine>) -> TranslationService {
    TranslationService::new(Arc::new(MockLoader::working(engine)))
}

/// Drain a translation stream into a vector of items
pub async fn collect_events(
    mut stream: TranslationStream,
) -> Vec<Result<TranslationEvent, TranslateError>> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}

/// The fragment payloads among the collected events, in order
pub fn fragments(events: &[Result<TranslationEvent, TranslateError>]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Ok(TranslationEvent::Fragment(text)) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// The terminal completed text, if the stream finished successfully
pub fn completed_text(events: &[Result<TranslationEvent, TranslateError>]) -> Option<String> {
    events.iter().find_map(|event| match event {
        Ok(TranslationEvent::Completed { text }) => Some(text.clone()),
        _ => None,
    })
}

/// Count newline characters in a string
pub fn newline_count(text: &str) -> usize {
    text.chars().filter(|&c| c == '\n').count()
}
