//! Error types for the language-model client.

use agribot_core::error::AgribotError;

/// Errors from a single generation call.
///
/// Every call site owns a local recovery path; none of these may escape
/// uncaught to the presentation boundary.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no API key configured (set llm.api_key or GOOGLE_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("response contained no text candidates")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

impl From<LlmError> for AgribotError {
    fn from(err: LlmError) -> Self {
        AgribotError::Llm(err.to_string())
    }
}
