/*!
 * Tests for app configuration file handling
 */

use std::fs;
use std::fs::File;
use std::io::BufReader;

use anyhow::Result;
use tempfile::TempDir;
use tradwai::app_config::{Config, Direction, LogLevel};

/// Loading a saved configuration reproduces the saved values
#[test]
fn test_configFile_savedThenLoaded_shouldRoundTrip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.direction = Direction::EnglishToFrench;
    config.engine.model = "mistral:7b".to_string();
    config.log_level = LogLevel::Debug;

    fs::write(&path, serde_json::to_string_pretty(&config)?)?;

    let reader = BufReader::new(File::open(&path)?);
    let loaded: Config = serde_json::from_reader(reader)?;

    assert_eq!(loaded.direction, Direction::EnglishToFrench);
    assert_eq!(loaded.engine.model, "mistral:7b");
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

/// A hand-written partial file fills the rest with defaults
#[test]
fn test_configFile_withPartialContent_shouldApplyDefaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("conf.json");
    fs::write(&path, r#"{ "engine": { "model": "aya:35b" } }"#)?;

    let reader = BufReader::new(File::open(&path)?);
    let loaded: Config = serde_json::from_reader(reader)?;

    assert_eq!(loaded.engine.model, "aya:35b");
    assert_eq!(loaded.engine.endpoint, "http://localhost:11434");
    assert_eq!(loaded.direction, Direction::FrenchToEnglish);
    assert!(loaded.validate().is_ok());
    Ok(())
}

/// Malformed JSON is rejected when parsing
#[test]
fn test_configFile_withInvalidJson_shouldFailToParse() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("conf.json");
    fs::write(&path, "{ direction: broken }")?;

    let reader = BufReader::new(File::open(&path)?);
    let result: std::result::Result<Config, _> = serde_json::from_reader(reader);
    assert!(result.is_err());
    Ok(())
}
