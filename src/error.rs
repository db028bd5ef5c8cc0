//! Error types for the change-tracking store.

use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store root must be a mapping, sequence, or model")]
    InvalidRoot,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("a non-empty path is required")]
    EmptyPath,

    #[error("surrogate target has been dropped")]
    DetachedTarget,

    #[error("store has been dropped")]
    DetachedStore,

    #[error("operation not supported by this model: {0}")]
    Unsupported(&'static str),

    #[error("invalid sequence index: {0:?}")]
    InvalidIndex(String),

    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
