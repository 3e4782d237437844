use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The translation directions are fixed, so this module only needs to turn
/// ISO 639 codes into human-readable names for banners and status output.
/// Get the English name of a language from an ISO 639-1 or ISO 639-2/T code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let language = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code),
        _ => None,
    };

    language
        .map(|l| l.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
