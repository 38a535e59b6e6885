use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("Invalid world frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SwarmError>;
