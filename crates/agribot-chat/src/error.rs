//! Error types for the conversational core.

use agribot_core::error::AgribotError;

/// Errors from the request pipeline.
///
/// Everything recoverable (classifier parse failures, specialist failures,
/// synthesis failures) is handled locally and never surfaces here; the only
/// error a caller sees is a malformed query, raised before any state is
/// touched.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("query must contain text or an image")]
    EmptyQuery,
}

impl From<ChatError> for AgribotError {
    fn from(err: ChatError) -> Self {
        AgribotError::Chat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::EmptyQuery;
        assert_eq!(err.to_string(), "query must contain text or an image");
    }

    #[test]
    fn test_chat_error_into_agribot_error() {
        let err: AgribotError = ChatError::EmptyQuery.into();
        assert!(matches!(err, AgribotError::Chat(_)));
    }
}
