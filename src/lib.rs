/*!
 * # tradwai - TRADuction With AI
 *
 * A Rust library for streaming French/English translation driven by a
 * local LLM inference engine.
 *
 * ## Features
 *
 * - Paragraph-wise translation with per-paragraph prompt templates
 * - Streaming output: fragments surface as the engine generates them
 * - Lazy engine lifecycle: the model loads on the first request with
 *   progress reporting, then the session is reused
 * - Advisory interruption of an in-flight translation
 * - Host capability probing decoupled from orchestration
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `capability`: Host environment probing
 * - `engine`: The inference engine seam:
 *   - `engine::ollama`: Local Ollama server implementation
 *   - `engine::mock`: Scripted engine for tests
 * - `translation`: Streaming translation:
 *   - `translation::paragraph`: Input segmentation
 *   - `translation::prompts`: Per-paragraph instruction templates
 *   - `translation::orchestrator`: The streaming translation loop
 *   - `translation::service`: Engine lifecycle around the orchestrator
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod capability;
pub mod engine;
pub mod errors;
pub mod language_utils;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, Direction};
pub use capability::{CapabilityProbe, EnvironmentReport, HostProbe, StaticProbe};
pub use engine::{ChatMessage, Engine, EngineLoader, LoadProgress, ProgressCallback};
pub use errors::{AppError, EngineError, TranslateError};
pub use translation::{TranslationEvent, TranslationService, TranslationStream};
pub use language_utils::get_language_name;
