/*!
 * Error types for the tradwai application.
 *
 * This module contains custom error types for the engine seam, the
 * translation workflow and the application layer, using the thiserror
 * crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to the inference engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error establishing or maintaining a connection to the engine
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error when sending a request to the engine fails
    #[error("Engine request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an engine response fails
    #[error("Failed to parse engine response: {0}")]
    Parse(String),

    /// Error returned by the engine API itself
    #[error("Engine responded with error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the engine
        message: String,
    },

    /// Error while loading the model into the engine
    #[error("Model load failed: {0}")]
    LoadFailed(String),
}

/// Errors that terminate a translation request
///
/// Both variants are terminal to the current request: there is no partial
/// retry and no resumption from the last successful paragraph.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The engine could not be initialized; the session stays unset so the
    /// next request retries the load from scratch
    #[error("Could not load the engine: {0}")]
    Load(#[source] EngineError),

    /// The engine failed while streaming a completion
    #[error("Generation failed: {0}")]
    Generation(#[source] EngineError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The host environment cannot run the engine; translation is disabled
    /// but the rest of the application keeps working
    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Error from a translation request
    #[error("Translation error: {0}")]
    Translation(#[from] TranslateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
