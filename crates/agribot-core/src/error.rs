use thiserror::Error;

/// Top-level error type for the AgriBot system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for AgribotError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgribotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Weather error: {0}")]
    Weather(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AgribotError {
    fn from(err: toml::de::Error) -> Self {
        AgribotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AgribotError {
    fn from(err: toml::ser::Error) -> Self {
        AgribotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AgribotError {
    fn from(err: serde_json::Error) -> Self {
        AgribotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for AgriBot operations.
pub type Result<T> = std::result::Result<T, AgribotError>;
