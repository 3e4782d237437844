/*!
 * Translation module for paragraph-wise streaming translation.
 *
 * This module contains the core translation functionality:
 * - `paragraph`: input segmentation and length classification
 * - `prompts`: per-paragraph instruction templates
 * - `orchestrator`: the streaming translation loop
 * - `service`: engine lifecycle around the orchestrator
 */

pub mod orchestrator;
pub mod paragraph;
pub mod prompts;
pub mod service;

// Re-export main types for easier usage
pub use orchestrator::{TranslationEvent, TranslationRequest, TranslationStream, translate};
pub use prompts::PromptSet;
pub use service::TranslationService;
