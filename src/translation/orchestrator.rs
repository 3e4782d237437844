/*!
 * Paragraph-wise streaming translation orchestration.
 *
 * The orchestrator drives one engine session through a full translation
 * request: it splits the input into paragraphs, selects a prompt template
 * per paragraph, forwards the engine's incremental deltas as fragments and
 * re-inserts the newline separators so that the concatenated output carries
 * exactly as many separators as the input.
 *
 * Paragraphs are processed strictly sequentially; the single conversation
 * session is reset once per request, before the first paragraph.
 */

use futures::stream::{self, Stream, StreamExt};
use log::debug;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_config::Direction;
use crate::engine::{ChatMessage, Engine};
use crate::errors::TranslateError;

use super::paragraph::{classify, split_paragraphs};
use super::prompts::PromptSet;

/// A translation request, immutable once created
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// The full input text
    pub text: String,
    /// The active translation direction
    pub direction: Direction,
}

impl TranslationRequest {
    /// Create a new request
    pub fn new(text: impl Into<String>, direction: Direction) -> Self {
        Self {
            text: text.into(),
            direction,
        }
    }
}

/// One item of a translation stream
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationEvent {
    /// One incremental piece of translated text
    Fragment(String),
    /// Terminal event; `text` equals the concatenation of all fragments
    Completed {
        /// The full translated text
        text: String,
    },
}

/// A lazy, finite, non-restartable sequence of translation events
///
/// A failed request ends with a single `Err` item; nothing follows it.
pub type TranslationStream =
    Pin<Box<dyn Stream<Item = Result<TranslationEvent, TranslateError>> + Send>>;

/// Translate a request against a live engine session
///
/// Empty input is a no-op: the stream finishes without producing anything
/// and the engine is never called.
pub fn translate(
    engine: Arc<dyn Engine>,
    prompts: PromptSet,
    request: TranslationRequest,
) -> TranslationStream {
    if request.text.is_empty() {
        return Box::pin(stream::empty());
    }

    let (tx, rx) = mpsc::channel::<Result<TranslationEvent, TranslateError>>(32);
    tokio::spawn(async move {
        if let Err(error) = drive(engine, prompts, request, &tx).await {
            let _ = tx.send(Err(error)).await;
        }
    });

    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    }))
}

/// Run the request to completion, pushing events into the channel
///
/// Returns Err only for failures that terminate the whole request; a closed
/// channel (the consumer went away) ends the work silently.
async fn drive(
    engine: Arc<dyn Engine>,
    prompts: PromptSet,
    request: TranslationRequest,
    tx: &mpsc::Sender<Result<TranslationEvent, TranslateError>>,
) -> Result<(), TranslateError> {
    engine
        .reset_conversation()
        .await
        .map_err(TranslateError::Generation)?;

    let paragraphs = split_paragraphs(&request.text);
    let count = paragraphs.len();
    let mut translated = String::new();

    for (index, paragraph) in paragraphs.iter().enumerate() {
        let is_last = index + 1 == count;

        if paragraph.is_empty() {
            // A blank line; its separator is owned by the preceding
            // paragraph, so only interior blanks emit one here.
            if !is_last {
                translated.push('\n');
                if tx
                    .send(Ok(TranslationEvent::Fragment("\n".to_string())))
                    .await
                    .is_err()
                {
                    return Ok(());
                }
            }
            continue;
        }

        let payload = prompts.payload(request.direction, classify(paragraph), paragraph);
        let mut deltas = engine
            .stream_completion(vec![ChatMessage::user(payload)])
            .await
            .map_err(TranslateError::Generation)?;

        while let Some(delta) = deltas.next().await {
            let delta = delta.map_err(TranslateError::Generation)?;
            translated.push_str(&delta);
            if tx
                .send(Ok(TranslationEvent::Fragment(delta)))
                .await
                .is_err()
            {
                return Ok(());
            }
        }

        if engine.is_interrupted() {
            // Advisory stop: keep the partial paragraph, skip the rest.
            debug!(
                "Request interrupted after paragraph {} of {}",
                index + 1,
                count
            );
            break;
        }

        if !is_last {
            translated.push('\n');
            if tx
                .send(Ok(TranslationEvent::Fragment("\n".to_string())))
                .await
                .is_err()
            {
                return Ok(());
            }
        }
    }

    let _ = tx
        .send(Ok(TranslationEvent::Completed { text: translated }))
        .await;
    Ok(())
}
