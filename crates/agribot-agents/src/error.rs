//! Error types for specialist invocations.

use agribot_core::error::AgribotError;
use agribot_llm::LlmError;

/// Errors from a single specialist call.
///
/// The orchestrator flattens these to the agent's textual result; one
/// specialist's failure never aborts its siblings or the request.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),
}

impl From<AgentError> for AgribotError {
    fn from(err: AgentError) -> Self {
        AgribotError::Agent(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_from_llm_error() {
        let err: AgentError = LlmError::EmptyResponse.into();
        assert!(err.to_string().contains("no text candidates"));
    }

    #[test]
    fn test_agent_error_into_agribot_error() {
        let err: AgribotError = AgentError::Llm(LlmError::EmptyResponse).into();
        assert!(matches!(err, AgribotError::Agent(_)));
    }
}
