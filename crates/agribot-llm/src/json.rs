//! Fenced-JSON parsing for model output.
//!
//! Classification and extraction prompts instruct the model to return JSON,
//! optionally wrapped in a markdown code fence. The fence must be stripped
//! before parsing; callers fall back deterministically on parse failure.

use serde::de::DeserializeOwned;

/// Strip an optional markdown code fence (with or without a language tag)
/// from around a block of text.
///
/// Returns the inner text trimmed. Text without a fence passes through
/// unchanged apart from trimming.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline;
    // single-line fences carry the info string glued to the payload.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Strip an optional code fence, then parse the remainder as JSON.
pub fn parse_fenced<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fence(text))
}
