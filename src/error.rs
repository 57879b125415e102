use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentValueError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("assertion failed: {0}")]
    Assertion(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, AgentValueError>;
