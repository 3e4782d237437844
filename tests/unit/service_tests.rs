/*!
 * Tests for the translation service engine lifecycle
 */

use std::sync::Arc;

use parking_lot::Mutex;
use tradwai::app_config::Direction;
use tradwai::engine::mock::{MockEngine, MockLoader};
use tradwai::engine::{Engine, LoadProgress, ProgressCallback, noop_progress};
use tradwai::errors::TranslateError;
use tradwai::translation::TranslationService;

use crate::common::{collect_events, completed_text, service_with};

/// Empty input never touches the loader or the engine
#[tokio::test]
async fn test_emptyInput_shouldNotLoadEngine() {
    let engine = Arc::new(MockEngine::working());
    let loader = Arc::new(MockLoader::working(Arc::clone(&engine)));
    let service = TranslationService::new(Arc::clone(&loader) as Arc<dyn tradwai::engine::EngineLoader>);

    let stream = service
        .translate_streaming("", Direction::FrenchToEnglish, noop_progress())
        .await;
    let events = collect_events(stream).await;

    assert!(events.is_empty());
    assert_eq!(loader.load_count(), 0);
    assert_eq!(engine.call_count(), 0);
    assert!(!service.is_loaded());
}

/// The engine is loaded once, on the first request, then reused
#[tokio::test]
async fn test_engineLifecycle_shouldLoadOnceAndReuse() {
    let engine = Arc::new(MockEngine::working());
    let loader = Arc::new(MockLoader::working(Arc::clone(&engine)));
    let service = TranslationService::new(Arc::clone(&loader) as Arc<dyn tradwai::engine::EngineLoader>);

    for _ in 0..2 {
        let stream = service
            .translate_streaming("Bonjour", Direction::FrenchToEnglish, noop_progress())
            .await;
        assert!(completed_text(&collect_events(stream).await).is_some());
    }

    assert_eq!(loader.load_count(), 1);
    assert!(service.is_loaded());
    // One conversation reset per request
    assert_eq!(engine.reset_count(), 2);
}

/// A failed load produces exactly one error item, no engine calls, and
/// leaves the session unset so the next request retries the load
#[tokio::test]
async fn test_loadFailure_shouldEmitSingleErrorAndRetryNextTime() {
    let loader = Arc::new(MockLoader::failing("weights unavailable"));
    let service = TranslationService::new(Arc::clone(&loader) as Arc<dyn tradwai::engine::EngineLoader>);

    let stream = service
        .translate_streaming("Bonjour\nmonde", Direction::FrenchToEnglish, noop_progress())
        .await;
    let events = collect_events(stream).await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        Err(TranslateError::Load(e)) => {
            assert!(e.to_string().contains("weights unavailable"));
        }
        other => panic!("expected a load error, got {:?}", other),
    }
    assert!(!service.is_loaded());
    assert_eq!(loader.load_count(), 1);

    // The next request retries from scratch
    let stream = service
        .translate_streaming("Encore", Direction::FrenchToEnglish, noop_progress())
        .await;
    let events = collect_events(stream).await;
    assert!(matches!(events[0], Err(TranslateError::Load(_))));
    assert_eq!(loader.load_count(), 2);
}

/// Load progress reports are forwarded and non-decreasing
#[tokio::test]
async fn test_loadProgress_shouldBeForwardedMonotonically() {
    let engine = Arc::new(MockEngine::working());
    let loader = Arc::new(
        MockLoader::working(engine).with_progress_script(vec![
            (0.1, "Fetching"),
            (0.4, "Fetching"),
            (0.4, "Verifying"),
            (1.0, "Ready"),
        ]),
    );
    let service = TranslationService::new(Arc::clone(&loader) as Arc<dyn tradwai::engine::EngineLoader>);

    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let progress: ProgressCallback = Arc::new(move |report: LoadProgress| {
        sink.lock().push(report.fraction);
    });

    let stream = service
        .translate_streaming("Bonjour", Direction::FrenchToEnglish, progress)
        .await;
    collect_events(stream).await;

    let fractions = reports.lock().clone();
    assert_eq!(fractions.len(), 4);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*fractions.last().unwrap(), 1.0);
}

/// Interrupt before any engine exists is a harmless no-op
#[tokio::test]
async fn test_interruptWithoutEngine_shouldDoNothing() {
    let service = TranslationService::new(Arc::new(MockLoader::failing("never loads")));
    service.interrupt();
    assert!(!service.is_loaded());
}

/// Interrupt is forwarded to the live engine
#[tokio::test]
async fn test_interrupt_shouldReachLiveEngine() {
    let engine = Arc::new(MockEngine::working());
    let service = service_with(Arc::clone(&engine));

    let stream = service
        .translate_streaming("Bonjour", Direction::FrenchToEnglish, noop_progress())
        .await;
    collect_events(stream).await;

    service.interrupt();
    assert!(engine.is_interrupted());
}

/// Runtime stats surface once the engine has generated something
#[tokio::test]
async fn test_runtimeStats_shouldPassThroughAfterGeneration() {
    let engine = Arc::new(MockEngine::working());
    let service = service_with(Arc::clone(&engine));

    assert!(service.runtime_stats().is_none());

    let stream = service
        .translate_streaming("Bonjour", Direction::FrenchToEnglish, noop_progress())
        .await;
    collect_events(stream).await;

    let stats = service.runtime_stats().expect("stats after a generation");
    assert!(stats.contains("mock engine"));
}

/// The model-cache check is answered by the loader
#[tokio::test]
async fn test_isModelCached_shouldAskLoader() {
    let service = service_with(Arc::new(MockEngine::working()));
    assert!(service.is_model_cached().await.unwrap());
}
