use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Active translation direction
    #[serde(default)]
    pub direction: Direction,

    /// Engine config
    #[serde(default)]
    pub engine: EngineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation direction between the two fixed languages
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    // @direction: French source, English target
    #[default]
    FrenchToEnglish,
    // @direction: English source, French target
    EnglishToFrench,
}

impl Direction {
    // @returns: The opposite direction
    pub fn reversed(self) -> Self {
        match self {
            Self::FrenchToEnglish => Self::EnglishToFrench,
            Self::EnglishToFrench => Self::FrenchToEnglish,
        }
    }

    // @returns: ISO 639-2/T code of the source language
    pub fn source_code(self) -> &'static str {
        match self {
            Self::FrenchToEnglish => "fra",
            Self::EnglishToFrench => "eng",
        }
    }

    // @returns: ISO 639-2/T code of the target language
    pub fn target_code(self) -> &'static str {
        match self {
            Self::FrenchToEnglish => "eng",
            Self::EnglishToFrench => "fra",
        }
    }
}

// Implement Display trait for Direction
impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrenchToEnglish => write!(f, "fr-en"),
            Self::EnglishToFrench => write!(f, "en-fr"),
        }
    }
}

// Implement FromStr trait for Direction
impl std::str::FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fr-en" | "fren" | "french-to-english" => Ok(Self::FrenchToEnglish),
            "en-fr" | "enfr" | "english-to-french" => Ok(Self::EnglishToFrench),
            _ => Err(anyhow!("Invalid translation direction: {}", s)),
        }
    }
}

/// Inference engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Model name in the engine's local store (e.g., "aya:8b")
    #[serde(default = "default_engine_model")]
    pub model: String,

    /// Engine endpoint URL
    #[serde(default = "default_engine_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long the engine keeps the model resident after a request
    #[serde(default)]
    pub keep_alive: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: default_engine_model(),
            endpoint: default_engine_endpoint(),
            timeout_secs: default_timeout_secs(),
            keep_alive: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_engine_model() -> String {
    "aya:8b".to_string()
}

fn default_engine_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate the direction resolves to known languages
        let _source_name = crate::language_utils::get_language_name(self.direction.source_code())?;
        let _target_name = crate::language_utils::get_language_name(self.direction.target_code())?;

        if self.engine.model.trim().is_empty() {
            return Err(anyhow!("Engine model name cannot be empty"));
        }

        if self.engine.endpoint.trim().is_empty() {
            return Err(anyhow!("Engine endpoint cannot be empty"));
        }

        // The endpoint must at least parse as a URL once a scheme is assumed
        let endpoint = &self.engine.endpoint;
        let candidate = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.clone()
        } else {
            format!("http://{}", endpoint)
        };
        url::Url::parse(&candidate)
            .map_err(|e| anyhow!("Invalid engine endpoint '{}': {}", endpoint, e))?;

        if self.engine.timeout_secs == 0 {
            return Err(anyhow!("Engine timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Resolve the default configuration file location
    ///
    /// A `conf.json` in the working directory wins; otherwise the user
    /// config directory is used.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from("conf.json");
        if local.exists() {
            return local;
        }

        dirs::config_dir()
            .map(|dir| dir.join("tradwai").join("conf.json"))
            .unwrap_or(local)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            engine: EngineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
