use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The pipeline identifies languages by two-letter ISO 639-1 codes and only
/// needs display names when building model prompts. Codes the table does not
/// know pass through unchanged so an exotic code never breaks translation.
/// Resolve a language code to its English display name
///
/// Accepts ISO 639-1 (2-letter) and ISO 639-3 (3-letter) codes; anything
/// unrecognized is returned as-is (identity fallback).
pub fn display_name(code: &str) -> String {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    };

    match language {
        Some(lang) => lang.to_name().to_string(),
        None => code.trim().to_string(),
    }
}

/// Check whether a code resolves to a known language
pub fn is_known_language(code: &str) -> bool {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized).is_some(),
        3 => Language::from_639_3(&normalized).is_some(),
        _ => false,
    }
}

/// Check if two language codes represent the same language
///
/// Normalizes both sides to ISO 639-3 before comparing, so "el" matches
/// "ell". Unknown codes only match themselves, byte for byte.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let normalized1 = code1.trim().to_lowercase();
    let normalized2 = code2.trim().to_lowercase();

    let lang1 = resolve(&normalized1);
    let lang2 = resolve(&normalized2);

    match (lang1, lang2) {
        (Some(a), Some(b)) => a == b,
        _ => normalized1 == normalized2,
    }
}

fn resolve(normalized: &str) -> Option<Language> {
    match normalized.len() {
        2 => Language::from_639_1(normalized),
        3 => Language::from_639_3(normalized),
        _ => None,
    }
}
