#[derive(Debug, thiserror::Error)]
pub enum AdkError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdkError>;
