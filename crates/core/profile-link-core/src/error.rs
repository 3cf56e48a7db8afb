//! Profile storage error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Profile store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
