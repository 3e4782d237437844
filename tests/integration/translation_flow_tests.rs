/*!
 * End-to-end translation workflow tests
 *
 * These drive the controller with a scripted engine and an injected
 * capability probe, the way an embedding shell would.
 */

use std::sync::Arc;

use tradwai::app_config::{Config, Direction};
use tradwai::app_controller::Controller;
use tradwai::capability::StaticProbe;
use tradwai::engine::mock::{MockEngine, MockLoader};
use tradwai::translation::TranslationService;

fn controller_with(engine: Arc<MockEngine>, direction: Direction) -> Controller {
    let mut config = Config::default();
    config.direction = direction;

    let service = Arc::new(TranslationService::new(Arc::new(MockLoader::working(
        engine,
    ))));
    Controller::with_parts(config, Box::new(StaticProbe::supported()), service)
}

/// A full run against a working engine succeeds and reuses the session
#[tokio::test]
async fn test_controllerRun_withWorkingEngine_shouldSucceed() {
    let engine = Arc::new(MockEngine::working());
    let controller = controller_with(Arc::clone(&engine), Direction::FrenchToEnglish);

    controller.run_text("Bonjour\nle monde").await.unwrap();

    assert_eq!(engine.call_count(), 2);
    assert_eq!(engine.reset_count(), 1);

    // Second run on the same controller reuses the engine session
    controller.run_text("Encore").await.unwrap();
    assert_eq!(engine.reset_count(), 2);
}

/// An unsupported environment blocks translation before any engine work
#[tokio::test]
async fn test_controllerRun_withUnsupportedHost_shouldFailBeforeLoading() {
    let engine = Arc::new(MockEngine::working());
    let loader = Arc::new(MockLoader::working(Arc::clone(&engine)));
    let service = Arc::new(TranslationService::new(
        Arc::clone(&loader) as Arc<dyn tradwai::engine::EngineLoader>
    ));
    let controller = Controller::with_parts(
        Config::default(),
        Box::new(StaticProbe::unsupported("32-bit host")),
        service,
    );

    let error = controller.run_text("Bonjour").await.unwrap_err();
    assert!(error.to_string().contains("32-bit host"));

    // The gate fires before any load attempt
    assert_eq!(loader.load_count(), 0);
    assert_eq!(engine.call_count(), 0);
}

/// A load failure surfaces as an error and the run can be retried
#[tokio::test]
async fn test_controllerRun_withFailingLoader_shouldReportAndAllowRetry() {
    let loader = Arc::new(MockLoader::failing("server offline"));
    let service = Arc::new(TranslationService::new(
        Arc::clone(&loader) as Arc<dyn tradwai::engine::EngineLoader>
    ));
    let controller = Controller::with_parts(
        Config::default(),
        Box::new(StaticProbe::supported()),
        service,
    );

    let error = controller.run_text("Bonjour").await.unwrap_err();
    assert!(error.to_string().contains("server offline"));

    // A later attempt goes through the loader again
    let _ = controller.run_text("Bonjour").await.unwrap_err();
    assert_eq!(loader.load_count(), 2);
}

/// A generation failure aborts the run with an error
#[tokio::test]
async fn test_controllerRun_withGenerationFailure_shouldReturnError() {
    let engine = Arc::new(MockEngine::failing());
    let controller = controller_with(Arc::clone(&engine), Direction::FrenchToEnglish);

    let error = controller.run_text("Bonjour").await.unwrap_err();
    assert!(error.to_string().contains("Generation failed"));
    assert_eq!(engine.call_count(), 1);
}

/// The status report works even when translation would be unsupported
#[tokio::test]
async fn test_controllerStatus_withUnsupportedHost_shouldStillReport() {
    let service = Arc::new(TranslationService::new(Arc::new(MockLoader::working(
        Arc::new(MockEngine::working()),
    ))));
    let controller = Controller::with_parts(
        Config::default(),
        Box::new(StaticProbe::unsupported("no 64-bit support")),
        service,
    );

    controller.run_status().await.unwrap();
}

/// The configured direction drives which template pair a run uses
#[tokio::test]
async fn test_controllerRun_directionFromConfig_shouldReachEngine() {
    let engine = Arc::new(MockEngine::working());
    let controller = controller_with(Arc::clone(&engine), Direction::EnglishToFrench);

    controller.run_text("Hello world").await.unwrap();

    let payload = engine.submitted_payloads().remove(0);
    assert!(payload.contains("vers le français"));
    assert!(payload.ends_with("Hello world"));
}
