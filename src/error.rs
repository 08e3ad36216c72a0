use thiserror::Error;
use uuid::Uuid;

/// Engine error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prediction already resolved: {0}")]
    AlreadyResolved(Uuid),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl EngineError {
    /// True if the error is a caller-input problem rather than a storage failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_) | EngineError::NotFound(_) | EngineError::AlreadyResolved(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
