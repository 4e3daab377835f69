//! Language utilities for subtitle language codes
//!
//! Video sites tag subtitle tracks with BCP 47 style codes such as `en`,
//! `en-US`, `pt-BR` or `zh-Hans`. Only the primary subtag is validated
//! against ISO 639-1 / ISO 639-3; region and script subtags pass through.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Extract the primary language subtag (`en-US` -> `en`)
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

// @resolves: ISO language from the primary subtag
fn lookup(code: &str) -> Option<Language> {
    let primary = primary_subtag(code);
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// Validate a subtitle language code
pub fn validate_language_code(code: &str) -> Result<()> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Get the English name of the language a code refers to
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Unknown language code: {}", code))
}

/// Check whether two codes share the same primary language
pub fn same_primary_language(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
